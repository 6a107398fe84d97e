use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::messagemodel::{Message, MessagePriority, MessageResponse, MessageStatus};

use super::Pagination;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    pub phone: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Subject must be between 1-200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Message must be between 1-5000 characters"))]
    pub body: String,

    pub priority: Option<MessagePriority>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateMessageStatusDto {
    pub status: Option<MessageStatus>,
    pub priority: Option<MessagePriority>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMessageDto {
    pub admin_id: Uuid,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RespondMessageDto {
    #[validate(length(min = 1, max = 5000, message = "Response must be between 1-5000 characters"))]
    pub body: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct MessageQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    pub status: Option<MessageStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterMessageDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub body: String,
    pub status: String,
    pub priority: String,
    pub needs_attention: bool,
    pub responses: Vec<MessageResponse>,
    pub assigned_to: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl FilterMessageDto {
    pub fn filter_message(message: &Message) -> Self {
        FilterMessageDto {
            id: message.id.to_string(),
            name: message.name.to_owned(),
            email: message.email.to_owned(),
            phone: message.phone.clone(),
            subject: message.subject.to_owned(),
            body: message.body.to_owned(),
            status: message.status.to_str().to_string(),
            priority: message.priority.to_str().to_string(),
            needs_attention: message.needs_attention(Utc::now()),
            responses: message.responses.0.clone(),
            assigned_to: message.assigned_to.map(|id| id.to_string()),
            created_at: message.created_at,
            resolved_at: message.resolved_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageData {
    pub message: FilterMessageDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponseDto {
    pub status: String,
    pub data: MessageData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponseDto {
    pub status: String,
    pub items: Vec<FilterMessageDto>,
    pub pagination: Pagination,
}
