use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::admindb::AdminExt,
    dtos::admindtos::{
        AdminData, AdminListResponseDto, AdminResponseDto, CreateAdminDto, FilterAdminDto,
        UpdateAdminDto,
    },
    dtos::{RequestQueryDto, Response},
    error::HttpError,
    middleware::{permission_check, JWTAuthMiddleware},
    models::adminmodel::Permission,
    utils::password,
    AppState,
};

pub fn admins_handler() -> Router {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route(
            "/:admin_id",
            get(get_admin)
                .put(update_admin)
                .delete(deactivate_admin),
        )
        .layer(middleware::from_fn(|state, req, next| {
            permission_check(state, req, next, Permission::ManageAdmins)
        }))
}

/// Rejects unknown permission names and returns the canonical
/// spelling of each, so only `Permission` strings are ever stored.
fn validate_permissions(permissions: &[String]) -> Result<Vec<String>, HttpError> {
    permissions
        .iter()
        .map(|value| {
            Permission::from_str(value)
                .map(|permission| permission.to_str().to_string())
                .ok_or_else(|| HttpError::bad_request(format!("Unknown permission: {}", value)))
        })
        .collect()
}

pub async fn list_admins(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<RequestQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let admins = app_state
        .db_client
        .get_admins(page as u32, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let count = app_state
        .db_client
        .get_admin_count()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(AdminListResponseDto {
        status: "success".to_string(),
        admins: admins.iter().map(FilterAdminDto::filter_admin).collect(),
        results: count,
    }))
}

pub async fn get_admin(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(admin_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let admin = app_state
        .db_client
        .get_admin(Some(admin_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Admin not found".to_string()))?;

    Ok(Json(AdminResponseDto {
        status: "success".to_string(),
        data: AdminData {
            admin: FilterAdminDto::filter_admin(&admin),
        },
    }))
}

pub async fn create_admin(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateAdminDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let permissions = validate_permissions(&body.permissions)?;

    let existing = app_state
        .db_client
        .get_admin(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing.is_some() {
        return Err(HttpError::bad_request(
            "Admin with this email already exists".to_string(),
        ));
    }

    let hashed = password::hash(&body.password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let admin = app_state
        .db_client
        .save_admin(body.name, body.email, hashed, body.role, permissions)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AdminResponseDto {
            status: "success".to_string(),
            data: AdminData {
                admin: FilterAdminDto::filter_admin(&admin),
            },
        }),
    ))
}

pub async fn update_admin(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(admin_id): Path<Uuid>,
    Json(body): Json<UpdateAdminDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let permissions = match body.permissions {
        Some(ref permissions) => Some(validate_permissions(permissions)?),
        None => None,
    };

    let admin = app_state
        .db_client
        .update_admin(admin_id, body.name, body.role, permissions)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Admin not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(AdminResponseDto {
        status: "success".to_string(),
        data: AdminData {
            admin: FilterAdminDto::filter_admin(&admin),
        },
    }))
}

pub async fn deactivate_admin(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_admin): Extension<JWTAuthMiddleware>,
    Path(admin_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    if admin_id == auth_admin.admin.id {
        return Err(HttpError::bad_request(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    app_state
        .db_client
        .deactivate_admin(admin_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Admin not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(Response {
        status: "success",
        message: "Admin account deactivated".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_permissions_come_back_in_canonical_form() {
        let input = vec![
            "manage_bookings".to_string(),
            "view_analytics".to_string(),
        ];
        let canonical = validate_permissions(&input).unwrap();
        assert_eq!(canonical, input);
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let input = vec!["manage_everything".to_string()];
        assert!(validate_permissions(&input).is_err());
    }

    #[test]
    fn permission_names_round_trip_through_parse() {
        for permission in [
            Permission::ManageBookings,
            Permission::ManageCustomers,
            Permission::ManageDrivers,
            Permission::ManageMessages,
            Permission::ManagePayments,
            Permission::ManageAdmins,
            Permission::ViewAnalytics,
        ] {
            assert_eq!(Permission::from_str(permission.to_str()), Some(permission));
        }
    }
}
