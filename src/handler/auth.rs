use std::sync::Arc;

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::admindb::AdminExt,
    dtos::admindtos::{
        AdminData, AdminLoginResponseDto, AdminResponseDto, FilterAdminDto, LoginAdminDto,
        UpdatePasswordDto,
    },
    dtos::Response,
    error::{ErrorMessage, HttpError},
    middleware::{auth, JWTAuthMiddleware},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(get_me).layer(middleware::from_fn(auth)))
        .route(
            "/password",
            put(update_password).layer(middleware::from_fn(auth)),
        )
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginAdminDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let admin = app_state
        .db_client
        .get_admin(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !admin.is_active {
        return Err(HttpError::forbidden(
            ErrorMessage::AccountDisabled.to_string(),
        ));
    }

    let password_matches = password::compare(&body.password, &admin.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matches {
        return Err(HttpError::bad_request(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    let token = token::create_token(
        &admin.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .record_admin_login(admin.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(AdminLoginResponseDto {
        status: "success".to_string(),
        token,
    }))
}

pub async fn get_me(
    Extension(auth_admin): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let response = AdminResponseDto {
        status: "success".to_string(),
        data: AdminData {
            admin: FilterAdminDto::filter_admin(&auth_admin.admin),
        },
    };

    Ok(Json(response))
}

pub async fn update_password(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_admin): Extension<JWTAuthMiddleware>,
    Json(body): Json<UpdatePasswordDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let matches = password::compare(&body.current_password, &auth_admin.admin.password)
        .map_err(|_| HttpError::bad_request("Current password is incorrect".to_string()))?;

    if !matches {
        return Err(HttpError::bad_request(
            "Current password is incorrect".to_string(),
        ));
    }

    let hashed = password::hash(body.new_password)
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    app_state
        .db_client
        .update_admin_password(auth_admin.admin.id, hashed)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(Response {
        status: "success",
        message: "Password updated successfully".to_string(),
    }))
}
