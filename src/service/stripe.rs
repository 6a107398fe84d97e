use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::{config::Config, error::HttpError};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Accepted clock skew between the gateway's signature timestamp and
/// our clock.
pub const WEBHOOK_TOLERANCE_SECONDS: i64 = 300;

#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Stripe request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe API error: {0}")]
    Api(String),

    #[error("Unexpected Stripe response: missing {0}")]
    MissingField(&'static str),
}

impl From<StripeError> for HttpError {
    fn from(error: StripeError) -> Self {
        HttpError::server_error(error.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub status: String,
    pub amount: i64,
}

#[derive(Debug, Clone)]
pub struct StripeService {
    secret_key: String,
    client: reqwest::Client,
}

impl StripeService {
    pub fn new(config: &Config) -> Self {
        Self {
            secret_key: config.stripe_secret_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Returns the gateway customer id for this email, creating the
    /// customer record when none exists yet.
    pub async fn find_or_create_customer(
        &self,
        email: &str,
        name: &str,
    ) -> Result<String, StripeError> {
        let response = self
            .client
            .get(format!("{}/customers", STRIPE_API_BASE))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if let Some(message) = body["error"]["message"].as_str() {
            return Err(StripeError::Api(message.to_string()));
        }

        if let Some(existing) = body["data"].as_array().and_then(|d| d.first()) {
            let id = existing["id"]
                .as_str()
                .ok_or(StripeError::MissingField("customer id"))?;
            return Ok(id.to_string());
        }

        let response = self
            .client
            .post(format!("{}/customers", STRIPE_API_BASE))
            .bearer_auth(&self.secret_key)
            .form(&[("email", email), ("name", name)])
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if let Some(message) = body["error"]["message"].as_str() {
            return Err(StripeError::Api(message.to_string()));
        }

        body["id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or(StripeError::MissingField("customer id"))
    }

    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        customer_id: &str,
        booking_id: &str,
        reference: &str,
    ) -> Result<PaymentIntent, StripeError> {
        let amount = amount_cents.to_string();
        let currency_lower = currency.to_lowercase();

        let params: Vec<(&str, &str)> = vec![
            ("amount", &amount),
            ("currency", &currency_lower),
            ("customer", customer_id),
            ("metadata[booking_id]", booking_id),
            ("metadata[reference]", reference),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", STRIPE_API_BASE))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if let Some(message) = body["error"]["message"].as_str() {
            return Err(StripeError::Api(message.to_string()));
        }

        Ok(PaymentIntent {
            id: body["id"]
                .as_str()
                .ok_or(StripeError::MissingField("payment intent id"))?
                .to_string(),
            client_secret: body["client_secret"]
                .as_str()
                .ok_or(StripeError::MissingField("client_secret"))?
                .to_string(),
            amount: body["amount"].as_i64().unwrap_or(amount_cents),
            currency: body["currency"].as_str().unwrap_or(&currency_lower).to_string(),
        })
    }

    /// Refund `amount_cents`, or the full charge when None.
    pub async fn create_refund(
        &self,
        payment_intent_id: &str,
        amount_cents: Option<i64>,
    ) -> Result<Refund, StripeError> {
        let mut params: Vec<(&str, String)> =
            vec![("payment_intent", payment_intent_id.to_string())];
        if let Some(amount) = amount_cents {
            params.push(("amount", amount.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/refunds", STRIPE_API_BASE))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if let Some(message) = body["error"]["message"].as_str() {
            return Err(StripeError::Api(message.to_string()));
        }

        Ok(Refund {
            id: body["id"]
                .as_str()
                .ok_or(StripeError::MissingField("refund id"))?
                .to_string(),
            status: body["status"].as_str().unwrap_or("unknown").to_string(),
            amount: body["amount"].as_i64().unwrap_or(0),
        })
    }
}

/// Verifies a `stripe-signature` header (`t=<ts>,v1=<hex>,...`)
/// against the raw request body: HMAC-SHA256 over `"{t}.{body}"`,
/// compared in constant time, with a bounded timestamp skew.
pub fn verify_webhook_signature(payload: &[u8], signature_header: &str, secret: &str) -> bool {
    verify_webhook_signature_at(payload, signature_header, secret, Utc::now().timestamp())
}

fn verify_webhook_signature_at(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now_ts: i64,
) -> bool {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = match timestamp {
        Some(ts) => ts,
        None => return false,
    };

    if (now_ts - timestamp).abs() > WEBHOOK_TOLERANCE_SECONDS {
        return false;
    }

    if candidates.is_empty() {
        return false;
    }

    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let expected = hex::encode(mac.finalize().into_bytes());

    candidates
        .iter()
        .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.", timestamp).as_bytes());
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_verifies() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let header = sign(payload, "whsec_test", 1_700_000_000);
        assert!(verify_webhook_signature_at(
            payload,
            &header,
            "whsec_test",
            1_700_000_000
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign(payload, "whsec_test", 1_700_000_000);
        assert!(!verify_webhook_signature_at(
            payload,
            &header,
            "whsec_other",
            1_700_000_000
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let header = sign(br#"{"amount":100}"#, "whsec_test", 1_700_000_000);
        assert!(!verify_webhook_signature_at(
            br#"{"amount":999}"#,
            &header,
            "whsec_test",
            1_700_000_000
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign(payload, "whsec_test", 1_700_000_000);
        assert!(!verify_webhook_signature_at(
            payload,
            &header,
            "whsec_test",
            1_700_000_000 + WEBHOOK_TOLERANCE_SECONDS + 1
        ));
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert!(!verify_webhook_signature_at(b"{}", "", "whsec_test", 0));
        assert!(!verify_webhook_signature_at(
            b"{}",
            "v1=deadbeef",
            "whsec_test",
            0
        ));
        assert!(!verify_webhook_signature_at(
            b"{}",
            "t=notanumber,v1=deadbeef",
            "whsec_test",
            0
        ));
    }
}
