use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{admindb::AdminExt, messagedb::MessageExt},
    dtos::messagedtos::{
        AssignMessageDto, CreateMessageDto, FilterMessageDto, MessageData, MessageListResponseDto,
        MessageQueryDto, MessageResponseDto, RespondMessageDto, UpdateMessageStatusDto,
    },
    dtos::Pagination,
    error::HttpError,
    middleware::{permission_check, JWTAuthMiddleware},
    models::{
        adminmodel::Permission,
        messagemodel::{Message, MessagePriority, MessageResponse},
    },
    AppState,
};

pub fn messages_handler() -> Router {
    Router::new()
        .route("/", get(list_messages))
        .route("/:message_id", get(get_message))
        .route("/:message_id/status", put(update_message_status))
        .route("/:message_id/assign", put(assign_message))
        .route("/:message_id/respond", post(respond_to_message))
        .layer(middleware::from_fn(|state, req, next| {
            permission_check(state, req, next, Permission::ManageMessages)
        }))
}

fn message_response(message: &Message) -> MessageResponseDto {
    MessageResponseDto {
        status: "success".to_string(),
        data: MessageData {
            message: FilterMessageDto::filter_message(message),
        },
    }
}

pub async fn create_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let priority = body.priority.unwrap_or(MessagePriority::Medium);

    let message = app_state
        .db_client
        .save_message(
            body.name,
            body.email,
            body.phone,
            body.subject,
            body.body,
            priority,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(message_response(&message))))
}

pub async fn list_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<MessageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    let messages = app_state
        .db_client
        .get_messages(page as u32, limit, query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let count = app_state
        .db_client
        .get_message_count(query.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(MessageListResponseDto {
        status: "success".to_string(),
        items: messages.iter().map(FilterMessageDto::filter_message).collect(),
        pagination: Pagination::new(page, limit, count),
    }))
}

pub async fn get_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let message = app_state
        .db_client
        .get_message(message_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Message not found".to_string()))?;

    Ok(Json(message_response(&message)))
}

pub async fn update_message_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
    Json(body): Json<UpdateMessageStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    if body.status.is_none() && body.priority.is_none() {
        return Err(HttpError::bad_request("Nothing to update".to_string()));
    }

    let message = app_state
        .db_client
        .update_message_status(message_id, body.status, body.priority)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Message not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(message_response(&message)))
}

pub async fn assign_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(message_id): Path<Uuid>,
    Json(body): Json<AssignMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_admin(Some(body.admin_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Admin not found".to_string()))?;

    let message = app_state
        .db_client
        .assign_message(message_id, body.admin_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Message not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(message_response(&message)))
}

pub async fn respond_to_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_admin): Extension<JWTAuthMiddleware>,
    Path(message_id): Path<Uuid>,
    Json(body): Json<RespondMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let response = MessageResponse {
        responder: auth_admin.admin.name.clone(),
        body: body.body,
        responded_at: Utc::now(),
    };

    let message = app_state
        .db_client
        .add_message_response(message_id, response)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Message not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(message_response(&message)))
}
