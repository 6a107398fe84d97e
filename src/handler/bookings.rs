use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{Datelike, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::{bookingdb::BookingExt, customerdb::CustomerExt, driverdb::DriverExt},
    dtos::bookingdtos::{
        AssignDriverDto, BookingData, BookingListResponseDto, BookingQueryDto, BookingResponseDto,
        CancelBookingDto, CreateBookingDto, FilterBookingDto, ReferenceLookupDto,
        StaffCancelBookingDto, UpdateBookingStatusDto,
    },
    dtos::Pagination,
    error::HttpError,
    middleware::permission_check,
    models::{
        adminmodel::Permission,
        bookingmodel::{BookingStatus, REFERENCE_PREFIX},
        drivermodel::DriverStatus,
    },
    AppState,
};

/// Staff-facing routes; the public create/cancel/lookup handlers are
/// wired separately without auth.
pub fn bookings_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(list_bookings).layer(middleware::from_fn(|state, req, next| {
                permission_check(state, req, next, Permission::ManageBookings)
            })),
        )
        .route(
            "/:booking_id",
            get(get_booking).layer(middleware::from_fn(|state, req, next| {
                permission_check(state, req, next, Permission::ManageBookings)
            })),
        )
        .route(
            "/:booking_id/status",
            put(update_booking_status).layer(middleware::from_fn(|state, req, next| {
                permission_check(state, req, next, Permission::ManageBookings)
            })),
        )
        .route(
            "/:booking_id/assign-driver",
            put(assign_driver).layer(middleware::from_fn(|state, req, next| {
                permission_check(state, req, next, Permission::ManageBookings)
            })),
        )
        .route(
            "/:booking_id/cancel",
            put(cancel_booking).layer(middleware::from_fn(|state, req, next| {
                permission_check(state, req, next, Permission::ManageBookings)
            })),
        )
}

fn validation_message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

fn parse_reference(reference: &str) -> Option<String> {
    let suffix = reference.strip_prefix(REFERENCE_PREFIX)?.strip_prefix('-')?;
    if suffix.len() != 8 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(suffix.to_ascii_lowercase())
}

fn booking_response(booking: &crate::models::bookingmodel::Booking) -> BookingResponseDto {
    BookingResponseDto {
        status: "success".to_string(),
        data: BookingData {
            booking: FilterBookingDto::filter_booking(booking),
        },
    }
}

pub async fn create_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;
    body.validate_phone_number()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;
    body.validate_service_fields()
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;
    body.validate_date_in_future(Utc::now())
        .map_err(|e| HttpError::bad_request(validation_message(&e)))?;

    let customer = app_state
        .db_client
        .get_or_create_customer(
            body.customer_name.clone(),
            body.customer_email.clone(),
            body.customer_phone.clone(),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let booking = app_state
        .db_client
        .save_booking(&body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .record_new_booking(customer.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        reference = %booking.reference(),
        "new booking created for {}",
        booking.customer_email
    );

    Ok((StatusCode::CREATED, Json(booking_response(&booking))))
}

pub async fn lookup_booking_by_reference(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(reference): Path<String>,
    Query(query): Query<ReferenceLookupDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let suffix = parse_reference(&reference)
        .ok_or_else(|| HttpError::bad_request("Invalid booking reference".to_string()))?;

    let booking = app_state
        .db_client
        .get_booking_by_id_suffix(&suffix)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Mismatched email gets the same 404 as a missing booking so the
    // endpoint does not confirm which references exist.
    let booking = booking
        .filter(|b| b.customer_email.eq_ignore_ascii_case(&query.email))
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    Ok(Json(booking_response(&booking)))
}

pub async fn self_cancel_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<CancelBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    if !booking.customer_email.eq_ignore_ascii_case(&body.email) {
        return Err(HttpError::forbidden(
            "Email does not match this booking".to_string(),
        ));
    }

    if let Some(blocker) = booking.self_cancellation_blocker(Utc::now()) {
        return Err(HttpError::bad_request(blocker.to_string()));
    }

    let note = match body.reason {
        Some(reason) => format!("Cancelled by customer: {}", reason),
        None => "Cancelled by customer".to_string(),
    };

    let cancelled = app_state
        .db_client
        .cancel_booking(booking_id, Some(note))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(booking_response(&cancelled)))
}

pub async fn list_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<BookingQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let bookings = app_state
        .db_client
        .get_bookings(
            page as u32,
            limit,
            query.booking_status,
            query.service_type,
            query.date_from,
            query.date_to,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let count = app_state
        .db_client
        .get_booking_count(
            query.booking_status,
            query.service_type,
            query.date_from,
            query.date_to,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(BookingListResponseDto {
        status: "success".to_string(),
        items: bookings.iter().map(FilterBookingDto::filter_booking).collect(),
        pagination: Pagination::new(page, limit, count),
    }))
}

pub async fn get_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    Ok(Json(booking_response(&booking)))
}

pub async fn update_booking_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<UpdateBookingStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if body.booking_status.is_none() && body.payment_status.is_none() && body.notes.is_none() {
        return Err(HttpError::bad_request("Nothing to update".to_string()));
    }

    let updated = app_state
        .db_client
        .update_booking_status(booking_id, body.booking_status, body.payment_status, body.notes)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Booking not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(booking_response(&updated)))
}

pub async fn assign_driver(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<AssignDriverDto>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    if matches!(
        booking.booking_status,
        BookingStatus::Cancelled | BookingStatus::Completed
    ) {
        return Err(HttpError::bad_request(
            "Cannot assign a driver to a cancelled or completed booking".to_string(),
        ));
    }

    let driver = app_state
        .db_client
        .get_driver(body.driver_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Driver not found".to_string()))?;

    if driver.status != DriverStatus::Active {
        return Err(HttpError::bad_request("Driver is not active".to_string()));
    }

    let weekday = booking.date_time.weekday();
    if !driver.working_hours.is_available_on(weekday) {
        return Err(HttpError::bad_request(format!(
            "Driver does not work on {}",
            weekday
        )));
    }

    let conflicts = app_state
        .db_client
        .find_conflicting_bookings(body.driver_id, booking.date_time, booking.end_time())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if conflicts.iter().any(|c| c.id != booking.id) {
        return Err(HttpError::bad_request(
            "Driver already has a booking in this time window".to_string(),
        ));
    }

    let updated = app_state
        .db_client
        .assign_driver(booking.id, body.driver_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        reference = %updated.reference(),
        "driver {} assigned to booking",
        driver.name
    );

    Ok(Json(booking_response(&updated)))
}

pub async fn cancel_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<StaffCancelBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    if booking.booking_status == BookingStatus::Cancelled {
        return Err(HttpError::bad_request(
            "Booking is already cancelled".to_string(),
        ));
    }

    let note = match body.reason {
        Some(reason) => format!("Cancelled by staff: {}", reason),
        None => "Cancelled by staff".to_string(),
    };

    let cancelled = app_state
        .db_client
        .cancel_booking(booking_id, Some(note))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(booking_response(&cancelled)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reference_accepts_valid_format() {
        assert_eq!(
            parse_reference("MFD-DEADBEEF"),
            Some("deadbeef".to_string())
        );
        assert_eq!(
            parse_reference("MFD-0a1B2c3D"),
            Some("0a1b2c3d".to_string())
        );
    }

    #[test]
    fn parse_reference_rejects_bad_input() {
        assert_eq!(parse_reference("DEADBEEF"), None);
        assert_eq!(parse_reference("MFD-DEADBEE"), None);
        assert_eq!(parse_reference("MFD-DEADBEEFF"), None);
        assert_eq!(parse_reference("MFD-NOTHEXXX"), None);
        assert_eq!(parse_reference(""), None);
    }
}
