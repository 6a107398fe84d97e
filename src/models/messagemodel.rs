use chrono::prelude::*;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    New,
    InProgress,
    Resolved,
    Escalated,
    Closed,
}

impl MessageStatus {
    pub fn to_str(&self) -> &str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::InProgress => "in_progress",
            MessageStatus::Resolved => "resolved",
            MessageStatus::Escalated => "escalated",
            MessageStatus::Closed => "closed",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self,
            MessageStatus::New | MessageStatus::InProgress | MessageStatus::Escalated
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "message_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl MessagePriority {
    pub fn to_str(&self) -> &str {
        match self {
            MessagePriority::Low => "low",
            MessagePriority::Medium => "medium",
            MessagePriority::High => "high",
            MessagePriority::Urgent => "urgent",
        }
    }

    /// Response-time SLA for each priority.
    pub fn sla(&self) -> Duration {
        match self {
            MessagePriority::Urgent => Duration::hours(2),
            MessagePriority::High => Duration::hours(8),
            MessagePriority::Medium => Duration::hours(24),
            MessagePriority::Low => Duration::hours(72),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MessageResponse {
    pub responder: String,
    pub body: String,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub body: String,
    pub status: MessageStatus,
    pub priority: MessagePriority,
    pub responses: Json<Vec<MessageResponse>>,
    pub assigned_to: Option<uuid::Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Message {
    /// An open message past its priority SLA needs staff attention.
    pub fn needs_attention(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && now - self.created_at > self.priority.sla()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(priority: MessagePriority, age: Duration, status: MessageStatus) -> Message {
        let now = Utc::now();
        Message {
            id: uuid::Uuid::new_v4(),
            name: "Riley Chen".to_string(),
            email: "riley@example.com".to_string(),
            phone: None,
            subject: "Airport pickup question".to_string(),
            body: "Do you track flight delays?".to_string(),
            status,
            priority,
            responses: Json(vec![]),
            assigned_to: None,
            created_at: now - age,
            updated_at: now - age,
            resolved_at: None,
        }
    }

    #[test]
    fn urgent_message_needs_attention_after_two_hours() {
        let now = Utc::now();
        let fresh = message(
            MessagePriority::Urgent,
            Duration::minutes(30),
            MessageStatus::New,
        );
        let stale = message(MessagePriority::Urgent, Duration::hours(3), MessageStatus::New);

        assert!(!fresh.needs_attention(now));
        assert!(stale.needs_attention(now));
    }

    #[test]
    fn low_priority_has_a_longer_window() {
        let now = Utc::now();
        let msg = message(MessagePriority::Low, Duration::hours(48), MessageStatus::New);
        assert!(!msg.needs_attention(now));
    }

    #[test]
    fn resolved_messages_never_need_attention() {
        let now = Utc::now();
        let msg = message(
            MessagePriority::Urgent,
            Duration::hours(100),
            MessageStatus::Resolved,
        );
        assert!(!msg.needs_attention(now));
    }
}
