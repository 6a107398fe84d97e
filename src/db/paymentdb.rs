use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;

use crate::{models::bookingmodel::Booking, utils::money};

const BOOKING_COLUMNS: &str = r#"
    id, customer_name, customer_email, customer_phone, service_type,
    pickup_location, dropoff_location, date_time, flight_number, train_number,
    passenger_count, notes, base_price_cents, additional_fees_cents,
    total_price_cents, currency, estimated_duration_minutes, payment_status,
    payment_method, booking_status, driver_assigned, stripe_payment_intent_id,
    stripe_customer_id, admin_notes, created_at, updated_at, confirmed_at,
    completed_at
"#;

/// Outcome of applying a gateway webhook event.
#[derive(Debug)]
pub enum WebhookApplyResult {
    Applied(Box<Booking>),
    /// The gateway event id was seen before; nothing was changed.
    Duplicate,
    /// No booking carries the referenced payment intent.
    UnknownIntent,
}

impl WebhookApplyResult {
    /// Disposition of a delivery before any state is written: an
    /// intent no booking carries is dropped, a replayed event id is
    /// skipped, and only a first delivery for a known intent goes on
    /// to be applied.
    fn for_delivery(
        booking: Option<Booking>,
        first_delivery: bool,
    ) -> Result<Booking, WebhookApplyResult> {
        match booking {
            None => Err(WebhookApplyResult::UnknownIntent),
            Some(_) if !first_delivery => Err(WebhookApplyResult::Duplicate),
            Some(booking) => Ok(booking),
        }
    }
}

#[async_trait]
pub trait PaymentExt {
    async fn set_payment_refs(
        &self,
        booking_id: Uuid,
        payment_intent_id: &str,
        stripe_customer_id: &str,
    ) -> Result<Booking, sqlx::Error>;

    /// Marks the booking paid and applies the customer spend rollup.
    /// The whole apply, including the idempotency-ledger insert, runs
    /// in one transaction; a replayed event id is a no-op.
    async fn apply_payment_succeeded(
        &self,
        payment_intent_id: &str,
        event_id: &str,
        event_type: &str,
    ) -> Result<WebhookApplyResult, sqlx::Error>;

    async fn apply_payment_failed(
        &self,
        payment_intent_id: &str,
        event_id: &str,
        event_type: &str,
    ) -> Result<WebhookApplyResult, sqlx::Error>;

    /// Records a completed gateway refund: payment refunded, booking
    /// cancelled, note appended, customer spend decremented.
    async fn apply_refund(
        &self,
        booking_id: Uuid,
        refund_amount_cents: i64,
        note: String,
    ) -> Result<Booking, sqlx::Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn set_payment_refs(
        &self,
        booking_id: Uuid,
        payment_intent_id: &str,
        stripe_customer_id: &str,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET stripe_payment_intent_id = $2,
                stripe_customer_id = $3,
                payment_method = 'card',
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(payment_intent_id)
        .bind(stripe_customer_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn apply_payment_succeeded(
        &self,
        payment_intent_id: &str,
        event_id: &str,
        event_type: &str,
    ) -> Result<WebhookApplyResult, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>(&format!(
            r#"SELECT {} FROM bookings WHERE stripe_payment_intent_id = $1 FOR UPDATE"#,
            BOOKING_COLUMNS
        ))
        .bind(payment_intent_id)
        .fetch_optional(&mut *tx)
        .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .execute(&mut *tx)
        .await?;

        // An early return drops the transaction, so a skipped
        // delivery leaves no ledger row behind either.
        let current =
            match WebhookApplyResult::for_delivery(current, inserted.rows_affected() > 0) {
                Ok(booking) => booking,
                Err(result) => return Ok(result),
            };

        // A booking still pending is advanced to confirmed; any later
        // status is left alone.
        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_status = 'paid'::payment_status,
                booking_status = CASE
                    WHEN booking_status = 'pending'::booking_status
                    THEN 'confirmed'::booking_status
                    ELSE booking_status
                END,
                confirmed_at = CASE
                    WHEN booking_status = 'pending'::booking_status
                    THEN NOW()
                    ELSE confirmed_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(current.id)
        .fetch_one(&mut *tx)
        .await?;

        let points = money::loyalty_points_for(current.total_price_cents);

        sqlx::query(
            r#"
            UPDATE customers
            SET total_spent_cents = total_spent_cents + $2,
                loyalty_points = loyalty_points + $3,
                vip_status = vip_status
                    OR (total_spent_cents + $2 >= 200000)
                    OR (completed_bookings >= 20),
                updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(&current.customer_email)
        .bind(current.total_price_cents)
        .bind(points as i32)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WebhookApplyResult::Applied(Box::new(updated)))
    }

    async fn apply_payment_failed(
        &self,
        payment_intent_id: &str,
        event_id: &str,
        event_type: &str,
    ) -> Result<WebhookApplyResult, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>(&format!(
            r#"SELECT {} FROM bookings WHERE stripe_payment_intent_id = $1 FOR UPDATE"#,
            BOOKING_COLUMNS
        ))
        .bind(payment_intent_id)
        .fetch_optional(&mut *tx)
        .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .execute(&mut *tx)
        .await?;

        // An early return drops the transaction, so a skipped
        // delivery leaves no ledger row behind either.
        let current =
            match WebhookApplyResult::for_delivery(current, inserted.rows_affected() > 0) {
                Ok(booking) => booking,
                Err(result) => return Ok(result),
            };

        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_status = 'failed'::payment_status,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(current.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(WebhookApplyResult::Applied(Box::new(updated)))
    }

    async fn apply_refund(
        &self,
        booking_id: Uuid,
        refund_amount_cents: i64,
        note: String,
    ) -> Result<Booking, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>(&format!(
            r#"SELECT {} FROM bookings WHERE id = $1 FOR UPDATE"#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;

        let admin_notes = match &current.admin_notes {
            Some(existing) => format!("{}\n{}", existing, note),
            None => note,
        };

        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_status = 'refunded'::payment_status,
                booking_status = 'cancelled'::booking_status,
                admin_notes = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(admin_notes)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE customers
            SET total_spent_cents = total_spent_cents - $2,
                updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(&current.customer_email)
        .bind(refund_amount_cents)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::{BookingStatus, PaymentStatus, ServiceType};
    use chrono::Utc;

    fn booking_with_intent() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_name: "Jordan Reyes".to_string(),
            customer_email: "jordan@example.com".to_string(),
            customer_phone: "+15551234567".to_string(),
            service_type: ServiceType::CityRide,
            pickup_location: "12 Harbor St".to_string(),
            dropoff_location: "Union Station".to_string(),
            date_time: Utc::now(),
            flight_number: None,
            train_number: None,
            passenger_count: 1,
            notes: None,
            base_price_cents: 12000,
            additional_fees_cents: 500,
            total_price_cents: 12500,
            currency: "USD".to_string(),
            estimated_duration_minutes: 120,
            payment_status: PaymentStatus::Pending,
            payment_method: Some("card".to_string()),
            booking_status: BookingStatus::Pending,
            driver_assigned: None,
            stripe_payment_intent_id: Some("pi_123".to_string()),
            stripe_customer_id: None,
            admin_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            confirmed_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn first_delivery_for_a_known_intent_is_applied() {
        let booking = booking_with_intent();
        let id = booking.id;
        let result = WebhookApplyResult::for_delivery(Some(booking), true);
        assert!(matches!(result, Ok(applied) if applied.id == id));
    }

    #[test]
    fn replayed_event_id_is_skipped() {
        let result = WebhookApplyResult::for_delivery(Some(booking_with_intent()), false);
        assert!(matches!(result, Err(WebhookApplyResult::Duplicate)));
    }

    #[test]
    fn unknown_intent_is_never_applied() {
        let result = WebhookApplyResult::for_delivery(None, true);
        assert!(matches!(result, Err(WebhookApplyResult::UnknownIntent)));
        let replayed = WebhookApplyResult::for_delivery(None, false);
        assert!(matches!(replayed, Err(WebhookApplyResult::UnknownIntent)));
    }
}
