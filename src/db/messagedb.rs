use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::messagemodel::{Message, MessagePriority, MessageResponse, MessageStatus};

const MESSAGE_COLUMNS: &str = r#"
    id, name, email, phone, subject, body, status, priority, responses,
    assigned_to, created_at, updated_at, resolved_at
"#;

#[async_trait]
pub trait MessageExt {
    async fn save_message(
        &self,
        name: String,
        email: String,
        phone: Option<String>,
        subject: String,
        body: String,
        priority: MessagePriority,
    ) -> Result<Message, sqlx::Error>;

    async fn get_message(&self, message_id: Uuid) -> Result<Option<Message>, sqlx::Error>;

    async fn get_messages(
        &self,
        page: u32,
        limit: usize,
        status: Option<MessageStatus>,
    ) -> Result<Vec<Message>, sqlx::Error>;

    async fn get_message_count(&self, status: Option<MessageStatus>) -> Result<i64, sqlx::Error>;

    async fn update_message_status(
        &self,
        message_id: Uuid,
        status: Option<MessageStatus>,
        priority: Option<MessagePriority>,
    ) -> Result<Message, sqlx::Error>;

    async fn assign_message(
        &self,
        message_id: Uuid,
        admin_id: Uuid,
    ) -> Result<Message, sqlx::Error>;

    /// Appends a staff response; a message still marked new moves to
    /// in_progress.
    async fn add_message_response(
        &self,
        message_id: Uuid,
        response: MessageResponse,
    ) -> Result<Message, sqlx::Error>;
}

#[async_trait]
impl MessageExt for DBClient {
    async fn save_message(
        &self,
        name: String,
        email: String,
        phone: Option<String>,
        subject: String,
        body: String,
        priority: MessagePriority,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (name, email, phone, subject, body, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(subject)
        .bind(body)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_message(&self, message_id: Uuid) -> Result<Option<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"SELECT {} FROM messages WHERE id = $1"#,
            MESSAGE_COLUMNS
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_messages(
        &self,
        page: u32,
        limit: usize,
        status: Option<MessageStatus>,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {}
            FROM messages
            WHERE ($3::message_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(limit as i64)
        .bind(offset)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_message_count(&self, status: Option<MessageStatus>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE ($1::message_status IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_message_status(
        &self,
        message_id: Uuid,
        status: Option<MessageStatus>,
        priority: Option<MessagePriority>,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages
            SET status = COALESCE($2, status),
                priority = COALESCE($3, priority),
                resolved_at = CASE
                    WHEN $2 = 'resolved'::message_status OR $2 = 'closed'::message_status
                    THEN NOW()
                    ELSE resolved_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message_id)
        .bind(status)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
    }

    async fn assign_message(
        &self,
        message_id: Uuid,
        admin_id: Uuid,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages
            SET assigned_to = $2,
                status = CASE
                    WHEN status = 'new'::message_status
                    THEN 'in_progress'::message_status
                    ELSE status
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message_id)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn add_message_response(
        &self,
        message_id: Uuid,
        response: MessageResponse,
    ) -> Result<Message, sqlx::Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            UPDATE messages
            SET responses = responses || $2::jsonb,
                status = CASE
                    WHEN status = 'new'::message_status
                    THEN 'in_progress'::message_status
                    ELSE status
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(message_id)
        .bind(Json(vec![response]))
        .fetch_one(&self.pool)
        .await
    }
}
