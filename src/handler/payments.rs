use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Path,
    http::HeaderMap,
    middleware,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        bookingdb::BookingExt,
        customerdb::CustomerExt,
        paymentdb::{PaymentExt, WebhookApplyResult},
    },
    dtos::bookingdtos::{BookingData, BookingResponseDto, FilterBookingDto},
    dtos::paymentdtos::{CreateIntentDto, CreateIntentResponseDto, RefundDto},
    error::HttpError,
    middleware::{permission_check, JWTAuthMiddleware},
    models::{
        adminmodel::Permission,
        bookingmodel::{BookingStatus, PaymentStatus},
    },
    service::stripe::verify_webhook_signature,
    utils::money,
    AppState,
};

/// Staff-facing refund route; intent creation and the webhook are
/// public and wired without auth.
pub fn payments_handler() -> Router {
    Router::new()
        .route("/:booking_id/refund", post(refund_booking))
        .layer(middleware::from_fn(|state, req, next| {
            permission_check(state, req, next, Permission::ManagePayments)
        }))
}

pub async fn create_payment_intent(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateIntentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .db_client
        .get_booking(body.booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    if !booking.customer_email.eq_ignore_ascii_case(&body.email) {
        return Err(HttpError::forbidden(
            "Email does not match this booking".to_string(),
        ));
    }

    match booking.payment_status {
        PaymentStatus::Paid => {
            return Err(HttpError::bad_request(
                "Booking is already paid".to_string(),
            ));
        }
        PaymentStatus::Refunded => {
            return Err(HttpError::bad_request(
                "Booking has been refunded".to_string(),
            ));
        }
        _ => {}
    }

    if booking.booking_status == BookingStatus::Cancelled {
        return Err(HttpError::bad_request("Booking is cancelled".to_string()));
    }

    let stripe_customer_id = app_state
        .stripe_service
        .find_or_create_customer(&booking.customer_email, &booking.customer_name)
        .await?;

    let intent = app_state
        .stripe_service
        .create_payment_intent(
            booking.total_price_cents,
            &booking.currency,
            &stripe_customer_id,
            &booking.id.to_string(),
            &booking.reference(),
        )
        .await?;

    let updated = app_state
        .db_client
        .set_payment_refs(booking.id, &intent.id, &stripe_customer_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(customer) = app_state
        .db_client
        .get_customer(None, Some(&booking.customer_email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
    {
        app_state
            .db_client
            .set_customer_stripe_id(customer.id, &stripe_customer_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
    }

    tracing::info!(
        reference = %updated.reference(),
        "payment intent {} created",
        intent.id
    );

    Ok(Json(CreateIntentResponseDto {
        status: "success".to_string(),
        client_secret: intent.client_secret,
        publishable_key: app_state.env.stripe_publishable_key.clone(),
        payment_intent_id: intent.id,
        amount: money::from_cents(updated.total_price_cents),
        currency: updated.currency,
    }))
}

pub async fn stripe_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError::bad_request("Missing Stripe-Signature header".to_string()))?;

    if !verify_webhook_signature(&body, signature, &app_state.env.stripe_webhook_secret) {
        return Err(HttpError::bad_request(
            "Invalid webhook signature".to_string(),
        ));
    }

    let event: Value = serde_json::from_slice(&body)
        .map_err(|_| HttpError::bad_request("Invalid webhook payload".to_string()))?;

    let event_id = event["id"].as_str().unwrap_or_default().to_string();
    let event_type = event["type"].as_str().unwrap_or_default().to_string();

    if event_id.is_empty() || event_type.is_empty() {
        return Err(HttpError::bad_request(
            "Webhook event is missing id or type".to_string(),
        ));
    }

    let object = &event["data"]["object"];
    let intent_id = match event_type.as_str() {
        "checkout.session.completed" => object["payment_intent"].as_str(),
        _ => object["id"].as_str(),
    };

    match event_type.as_str() {
        "payment_intent.succeeded" | "checkout.session.completed" => {
            let intent_id = intent_id.ok_or_else(|| {
                HttpError::bad_request("Webhook event has no payment intent".to_string())
            })?;

            let result = app_state
                .db_client
                .apply_payment_succeeded(intent_id, &event_id, &event_type)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            match result {
                WebhookApplyResult::Applied(booking) => {
                    tracing::info!(
                        reference = %booking.reference(),
                        "payment succeeded, booking marked paid"
                    );
                }
                WebhookApplyResult::Duplicate => {
                    tracing::info!("duplicate webhook event {}, skipping", event_id);
                }
                WebhookApplyResult::UnknownIntent => {
                    tracing::warn!("webhook for unknown payment intent {}", intent_id);
                }
            }
        }
        "payment_intent.payment_failed" | "payment_intent.canceled" => {
            let intent_id = intent_id.ok_or_else(|| {
                HttpError::bad_request("Webhook event has no payment intent".to_string())
            })?;

            let result = app_state
                .db_client
                .apply_payment_failed(intent_id, &event_id, &event_type)
                .await
                .map_err(|e| HttpError::server_error(e.to_string()))?;

            match result {
                WebhookApplyResult::Applied(booking) => {
                    tracing::info!(
                        reference = %booking.reference(),
                        "payment failed, booking marked unpaid"
                    );
                }
                WebhookApplyResult::Duplicate => {
                    tracing::info!("duplicate webhook event {}, skipping", event_id);
                }
                WebhookApplyResult::UnknownIntent => {
                    tracing::warn!("webhook for unknown payment intent {}", intent_id);
                }
            }
        }
        other => {
            tracing::debug!("unhandled webhook event type {}", other);
        }
    }

    Ok(Json(json!({ "status": "success" })))
}

pub async fn refund_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_admin): Extension<JWTAuthMiddleware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<RefundDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .db_client
        .get_booking(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found".to_string()))?;

    let amount_cents = match body.amount {
        Some(amount) => money::to_cents(amount),
        None => booking.total_price_cents,
    };

    if let Some(blocker) = booking.refund_blocker(amount_cents) {
        return Err(HttpError::bad_request(blocker.to_string()));
    }

    let intent_id = booking
        .stripe_payment_intent_id
        .clone()
        .ok_or_else(|| {
            HttpError::bad_request("Booking has no payment intent on record".to_string())
        })?;

    let refund = app_state
        .stripe_service
        .create_refund(&intent_id, Some(amount_cents))
        .await?;

    let note = match body.reason {
        Some(reason) => format!(
            "Refund {} issued by {}: {}",
            refund.id, auth_admin.admin.name, reason
        ),
        None => format!("Refund {} issued by {}", refund.id, auth_admin.admin.name),
    };

    let updated = app_state
        .db_client
        .apply_refund(booking.id, amount_cents, note)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!(
        reference = %updated.reference(),
        "refund of {} recorded",
        money::format_cents(amount_cents, &updated.currency)
    );

    Ok(Json(BookingResponseDto {
        status: "success".to_string(),
        data: BookingData {
            booking: FilterBookingDto::filter_booking(&updated),
        },
    }))
}
