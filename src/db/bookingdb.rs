use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;

use crate::{
    dtos::bookingdtos::CreateBookingDto,
    models::bookingmodel::{Booking, BookingStatus, PaymentStatus, ServiceType},
    utils::money,
};

const BOOKING_COLUMNS: &str = r#"
    id, customer_name, customer_email, customer_phone, service_type,
    pickup_location, dropoff_location, date_time, flight_number, train_number,
    passenger_count, notes, base_price_cents, additional_fees_cents,
    total_price_cents, currency, estimated_duration_minutes, payment_status,
    payment_method, booking_status, driver_assigned, stripe_payment_intent_id,
    stripe_customer_id, admin_notes, created_at, updated_at, confirmed_at,
    completed_at
"#;

#[async_trait]
pub trait BookingExt {
    async fn save_booking(&self, dto: &CreateBookingDto) -> Result<Booking, sqlx::Error>;

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error>;

    /// Looks a booking up by the hex suffix of its id, which is what
    /// the public reference encodes.
    async fn get_booking_by_id_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<Booking>, sqlx::Error>;

    async fn get_bookings(
        &self,
        page: u32,
        limit: usize,
        booking_status: Option<BookingStatus>,
        service_type: Option<ServiceType>,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Booking>, sqlx::Error>;

    async fn get_booking_count(
        &self,
        booking_status: Option<BookingStatus>,
        service_type: Option<ServiceType>,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error>;

    /// Status transition with side effects. Confirmation stamps
    /// confirmed_at; completion stamps completed_at and, when the
    /// payment is already marked paid, applies the customer
    /// completion rollup in the same transaction.
    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        booking_status: Option<BookingStatus>,
        payment_status: Option<PaymentStatus>,
        notes: Option<String>,
    ) -> Result<Booking, sqlx::Error>;

    async fn assign_driver(
        &self,
        booking_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Booking, sqlx::Error>;

    /// Cancels the booking and bumps the customer's cancellation
    /// counter atomically. Bookings are never hard-deleted.
    async fn cancel_booking(
        &self,
        booking_id: Uuid,
        note: Option<String>,
    ) -> Result<Booking, sqlx::Error>;

    /// Confirmed or in-progress bookings of the driver whose trip
    /// interval overlaps `[new_start, new_end)`.
    async fn find_conflicting_bookings(
        &self,
        driver_id: Uuid,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, sqlx::Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn save_booking(&self, dto: &CreateBookingDto) -> Result<Booking, sqlx::Error> {
        let (base_price_cents, additional_fees_cents, total_price_cents) = dto.price_cents();

        sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (
                customer_name, customer_email, customer_phone, service_type,
                pickup_location, dropoff_location, date_time, flight_number,
                train_number, passenger_count, notes, base_price_cents,
                additional_fees_cents, total_price_cents, currency,
                estimated_duration_minutes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(&dto.customer_name)
        .bind(&dto.customer_email)
        .bind(&dto.customer_phone)
        .bind(dto.service_type)
        .bind(&dto.pickup_location)
        .bind(&dto.dropoff_location)
        .bind(dto.date_time)
        .bind(&dto.flight_number)
        .bind(&dto.train_number)
        .bind(dto.passenger_count.unwrap_or(1))
        .bind(&dto.notes)
        .bind(base_price_cents)
        .bind(additional_fees_cents)
        .bind(total_price_cents)
        .bind(dto.currency.clone().unwrap_or_else(|| "USD".to_string()))
        .bind(dto.estimated_duration_minutes.unwrap_or(120))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"SELECT {} FROM bookings WHERE id = $1"#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_booking_by_id_suffix(
        &self,
        suffix: &str,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE REPLACE(id::text, '-', '') ILIKE '%' || $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            BOOKING_COLUMNS
        ))
        .bind(suffix)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_bookings(
        &self,
        page: u32,
        limit: usize,
        booking_status: Option<BookingStatus>,
        service_type: Option<ServiceType>,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE ($3::booking_status IS NULL OR booking_status = $3)
              AND ($4::service_type IS NULL OR service_type = $4)
              AND ($5::timestamptz IS NULL OR date_time >= $5)
              AND ($6::timestamptz IS NULL OR date_time <= $6)
            ORDER BY date_time DESC
            LIMIT $1 OFFSET $2
            "#,
            BOOKING_COLUMNS
        ))
        .bind(limit as i64)
        .bind(offset)
        .bind(booking_status)
        .bind(service_type)
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_booking_count(
        &self,
        booking_status: Option<BookingStatus>,
        service_type: Option<ServiceType>,
        date_from: Option<DateTime<Utc>>,
        date_to: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE ($1::booking_status IS NULL OR booking_status = $1)
              AND ($2::service_type IS NULL OR service_type = $2)
              AND ($3::timestamptz IS NULL OR date_time >= $3)
              AND ($4::timestamptz IS NULL OR date_time <= $4)
            "#,
        )
        .bind(booking_status)
        .bind(service_type)
        .bind(date_from)
        .bind(date_to)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        booking_status: Option<BookingStatus>,
        payment_status: Option<PaymentStatus>,
        notes: Option<String>,
    ) -> Result<Booking, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>(&format!(
            r#"SELECT {} FROM bookings WHERE id = $1 FOR UPDATE"#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let new_booking_status = booking_status.unwrap_or(current.booking_status);
        let new_payment_status = payment_status.unwrap_or(current.payment_status);

        let confirmed_at = if booking_status == Some(BookingStatus::Confirmed) {
            Some(now)
        } else {
            current.confirmed_at
        };
        let completed_at = if booking_status == Some(BookingStatus::Completed) {
            Some(now)
        } else {
            current.completed_at
        };

        let admin_notes = append_note(current.admin_notes.as_deref(), notes.as_deref());

        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET booking_status = $2,
                payment_status = $3,
                admin_notes = $4,
                confirmed_at = $5,
                completed_at = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(new_booking_status)
        .bind(new_payment_status)
        .bind(admin_notes)
        .bind(confirmed_at)
        .bind(completed_at)
        .fetch_one(&mut *tx)
        .await?;

        let completed_now = completion_transition(current.booking_status, booking_status);

        if completion_rollup_applies(current.booking_status, booking_status, new_payment_status) {
            let points = money::loyalty_points_for(current.total_price_cents);

            sqlx::query(
                r#"
                UPDATE customers
                SET completed_bookings = completed_bookings + 1,
                    total_spent_cents = total_spent_cents + $2,
                    loyalty_points = loyalty_points + $3,
                    vip_status = vip_status
                        OR (total_spent_cents + $2 >= 200000)
                        OR (completed_bookings + 1 >= 20),
                    updated_at = NOW()
                WHERE email = $1
                "#,
            )
            .bind(&current.customer_email)
            .bind(current.total_price_cents)
            .bind(points as i32)
            .execute(&mut *tx)
            .await?;
        }

        if completed_now {
            if let Some(driver_id) = current.driver_assigned {
                sqlx::query(
                    r#"
                    UPDATE drivers
                    SET total_rides = total_rides + 1,
                        completed_rides = completed_rides + 1,
                        availability_status = 'available'::availability_status,
                        updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(updated)
    }

    async fn assign_driver(
        &self,
        booking_id: Uuid,
        driver_id: Uuid,
    ) -> Result<Booking, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET driver_assigned = $2,
                booking_status = 'confirmed'::booking_status,
                confirmed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(driver_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE drivers
            SET availability_status = 'busy'::availability_status,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(driver_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn cancel_booking(
        &self,
        booking_id: Uuid,
        note: Option<String>,
    ) -> Result<Booking, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>(&format!(
            r#"SELECT {} FROM bookings WHERE id = $1 FOR UPDATE"#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;

        let admin_notes = append_note(current.admin_notes.as_deref(), note.as_deref());

        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET booking_status = 'cancelled'::booking_status,
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
            SET cancelled_bookings = cancelled_bookings + 1,
                updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(&current.customer_email)
        .execute(&mut *tx)
        .await?;

        if let Some(driver_id) = current.driver_assigned {
            sqlx::query(
                r#"
                UPDATE drivers
                SET total_rides = total_rides + 1,
                    cancelled_rides = cancelled_rides + 1,
                    availability_status = 'available'::availability_status,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(driver_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    async fn find_conflicting_bookings(
        &self,
        driver_id: Uuid,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE driver_assigned = $1
              AND booking_status IN ('confirmed'::booking_status, 'in_progress'::booking_status)
              AND date_time < $3
              AND date_time + make_interval(mins => estimated_duration_minutes) > $2
            "#,
            BOOKING_COLUMNS
        ))
        .bind(driver_id)
        .bind(new_start)
        .bind(new_end)
        .fetch_all(&self.pool)
        .await
    }
}

/// True only on the transition into completed; a booking that was
/// already completed never re-triggers completion side effects.
fn completion_transition(previous: BookingStatus, requested: Option<BookingStatus>) -> bool {
    requested == Some(BookingStatus::Completed) && previous != BookingStatus::Completed
}

/// The customer spend/loyalty rollup fires on the completion
/// transition only when the payment ends up marked paid. An unpaid
/// completion leaves the customer row untouched.
fn completion_rollup_applies(
    previous: BookingStatus,
    requested: Option<BookingStatus>,
    payment_after: PaymentStatus,
) -> bool {
    completion_transition(previous, requested) && payment_after == PaymentStatus::Paid
}

fn append_note(existing: Option<&str>, note: Option<&str>) -> Option<String> {
    match (existing, note) {
        (Some(existing), Some(note)) => Some(format!("{}\n{}", existing, note)),
        (None, Some(note)) => Some(note.to_string()),
        (Some(existing), None) => Some(existing.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_note_combines_with_newline() {
        assert_eq!(
            append_note(Some("first"), Some("second")),
            Some("first\nsecond".to_string())
        );
        assert_eq!(append_note(None, Some("only")), Some("only".to_string()));
        assert_eq!(append_note(Some("kept"), None), Some("kept".to_string()));
        assert_eq!(append_note(None, None), None);
    }

    #[test]
    fn completing_a_paid_booking_triggers_the_rollup() {
        assert!(completion_rollup_applies(
            BookingStatus::InProgress,
            Some(BookingStatus::Completed),
            PaymentStatus::Paid
        ));
    }

    #[test]
    fn completing_an_unpaid_booking_skips_the_rollup() {
        assert!(!completion_rollup_applies(
            BookingStatus::InProgress,
            Some(BookingStatus::Completed),
            PaymentStatus::Pending
        ));
        assert!(!completion_rollup_applies(
            BookingStatus::InProgress,
            Some(BookingStatus::Completed),
            PaymentStatus::Failed
        ));
    }

    #[test]
    fn re_completing_a_booking_does_not_double_count() {
        assert!(!completion_rollup_applies(
            BookingStatus::Completed,
            Some(BookingStatus::Completed),
            PaymentStatus::Paid
        ));
        assert!(!completion_transition(
            BookingStatus::Completed,
            Some(BookingStatus::Completed)
        ));
    }

    #[test]
    fn status_updates_without_completion_leave_counters_alone() {
        assert!(!completion_transition(
            BookingStatus::Pending,
            Some(BookingStatus::Confirmed)
        ));
        assert!(!completion_transition(BookingStatus::InProgress, None));
    }
}
