use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentDto {
    pub booking_id: Uuid,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateIntentResponseDto {
    pub status: String,
    pub client_secret: String,
    pub publishable_key: String,
    pub payment_intent_id: String,
    pub amount: f64,
    pub currency: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RefundDto {
    /// Amount in major units; None refunds the full total.
    #[validate(range(min = 0.01, message = "Refund amount must be positive"))]
    pub amount: Option<f64>,
    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,
}
