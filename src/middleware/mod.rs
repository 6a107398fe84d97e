pub mod rate_limit;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::admindb::AdminExt,
    error::{ErrorMessage, HttpError},
    models::adminmodel::{Admin, Permission},
    utils::token,
    AppState,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub admin: Admin,
}

pub async fn auth(
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| {
            if auth_value.starts_with("Bearer ") {
                Some(auth_value[7..].to_owned())
            } else {
                None
            }
        })
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let token_details = match token::decode_token(token, app_state.env.jwt_secret.as_bytes()) {
        Ok(token_details) => token_details,
        Err(_) => {
            return Err(HttpError::unauthorized(
                ErrorMessage::InvalidToken.to_string(),
            ));
        }
    };

    let admin_id = uuid::Uuid::parse_str(&token_details)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let admin = app_state
        .db_client
        .get_admin(Some(admin_id), None)
        .await
        .map_err(|_| HttpError::unauthorized(ErrorMessage::AdminNoLongerExist.to_string()))?;

    let admin =
        admin.ok_or_else(|| HttpError::unauthorized(ErrorMessage::AdminNoLongerExist.to_string()))?;

    if !admin.is_active {
        return Err(HttpError::forbidden(
            ErrorMessage::AccountDisabled.to_string(),
        ));
    }

    req.extensions_mut().insert(JWTAuthMiddleware {
        admin: admin.clone(),
    });

    Ok(next.run(req).await)
}

pub async fn permission_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required: Permission,
) -> Result<impl IntoResponse, HttpError> {
    let auth = req
        .extensions()
        .get::<JWTAuthMiddleware>()
        .ok_or_else(|| {
            HttpError::unauthorized(ErrorMessage::AdminNotAuthenticated.to_string())
        })?;

    if !auth.admin.has_permission(required) {
        return Err(HttpError::forbidden(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    Ok(next.run(req).await)
}
