use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::driverdb::DriverExt,
    dtos::driverdtos::{
        CreateDriverDto, DriverData, DriverListResponseDto, DriverQueryDto, DriverResponseDto,
        FilterDriverDto, RateDriverDto, UpdateAvailabilityDto, UpdateDriverDto,
    },
    dtos::{Pagination, Response},
    error::HttpError,
    middleware::permission_check,
    models::{adminmodel::Permission, drivermodel::WorkingHours},
    AppState,
};

pub fn drivers_handler() -> Router {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route(
            "/:driver_id",
            get(get_driver).put(update_driver).delete(deactivate_driver),
        )
        .route("/:driver_id/availability", put(update_availability))
        .route("/:driver_id/rating", post(rate_driver))
        .layer(middleware::from_fn(|state, req, next| {
            permission_check(state, req, next, Permission::ManageDrivers)
        }))
}

fn driver_response(driver: &crate::models::drivermodel::Driver) -> DriverResponseDto {
    DriverResponseDto {
        status: "success".to_string(),
        data: DriverData {
            driver: FilterDriverDto::filter_driver(driver),
        },
    }
}

pub async fn list_drivers(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<DriverQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let drivers = app_state
        .db_client
        .get_drivers(page as u32, limit, query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let count = app_state
        .db_client
        .get_driver_count(query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(DriverListResponseDto {
        status: "success".to_string(),
        items: drivers.iter().map(FilterDriverDto::filter_driver).collect(),
        pagination: Pagination::new(page, limit, count),
    }))
}

pub async fn get_driver(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let driver = app_state
        .db_client
        .get_driver(driver_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Driver not found".to_string()))?;

    Ok(Json(driver_response(&driver)))
}

pub async fn create_driver(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateDriverDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing = app_state
        .db_client
        .get_driver_by_email(&body.email)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::bad_request(
            "Driver with this email already exists".to_string(),
        ));
    }

    let working_hours = body.working_hours.unwrap_or_else(WorkingHours::full_week);

    let driver = app_state
        .db_client
        .save_driver(
            body.name,
            body.email,
            body.phone,
            body.license_number,
            body.vehicles,
            working_hours,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(driver_response(&driver))))
}

pub async fn update_driver(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
    Json(body): Json<UpdateDriverDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let driver = app_state
        .db_client
        .update_driver(
            driver_id,
            body.name,
            body.phone,
            body.license_number,
            body.vehicles,
            body.working_hours,
            body.status,
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Driver not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(driver_response(&driver)))
}

pub async fn update_availability(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
    Json(body): Json<UpdateAvailabilityDto>,
) -> Result<impl IntoResponse, HttpError> {
    let driver = app_state
        .db_client
        .update_driver_availability(driver_id, body.availability_status)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Driver not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(driver_response(&driver)))
}

pub async fn deactivate_driver(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .deactivate_driver(driver_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Driver not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(Response {
        status: "success",
        message: "Driver deactivated".to_string(),
    }))
}

pub async fn rate_driver(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(driver_id): Path<Uuid>,
    Json(body): Json<RateDriverDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let driver = app_state
        .db_client
        .add_driver_rating(driver_id, body.rating)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Driver not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(driver_response(&driver)))
}
