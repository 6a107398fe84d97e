use chrono::prelude::*;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Minimum lead time for a customer-initiated cancellation.
pub const SELF_CANCEL_WINDOW_HOURS: i64 = 24;

pub const REFERENCE_PREFIX: &str = "MFD";

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    CityRide,
    AirportPickup,
    TrainPickup,
    Other,
}

impl ServiceType {
    pub fn to_str(&self) -> &str {
        match self {
            ServiceType::CityRide => "city_ride",
            ServiceType::AirportPickup => "airport_pickup",
            ServiceType::TrainPickup => "train_pickup",
            ServiceType::Other => "other",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub id: uuid::Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub service_type: ServiceType,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub date_time: DateTime<Utc>,
    pub flight_number: Option<String>,
    pub train_number: Option<String>,
    pub passenger_count: i32,
    pub notes: Option<String>,
    pub base_price_cents: i64,
    pub additional_fees_cents: i64,
    pub total_price_cents: i64,
    pub currency: String,
    pub estimated_duration_minutes: i32,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub booking_status: BookingStatus,
    pub driver_assigned: Option<uuid::Uuid>,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub admin_notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Human-facing reference code: prefix + last 8 hex chars of the
    /// id, uppercased. Derived, never stored.
    pub fn reference(&self) -> String {
        reference_for_id(&self.id)
    }

    /// End of the trip interval used for driver conflict checks.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.date_time + Duration::minutes(self.estimated_duration_minutes as i64)
    }

    /// Why a customer-initiated cancellation is not allowed right
    /// now, or None when it is.
    pub fn self_cancellation_blocker(&self, now: DateTime<Utc>) -> Option<&'static str> {
        if self.payment_status == PaymentStatus::Refunded {
            return Some("This booking has already been refunded");
        }
        if self.booking_status != BookingStatus::Pending
            && self.booking_status != BookingStatus::Confirmed
        {
            return Some("Only pending or confirmed bookings can be cancelled");
        }
        if self.date_time - now < Duration::hours(SELF_CANCEL_WINDOW_HOURS) {
            return Some("Bookings can only be cancelled at least 24 hours before pickup");
        }
        None
    }

    /// Why a refund of `refund_amount_cents` cannot be issued, or
    /// None when it can. Only bookings currently marked paid qualify,
    /// so an already-refunded booking is rejected here, and the
    /// amount can never exceed what was collected.
    pub fn refund_blocker(&self, refund_amount_cents: i64) -> Option<&'static str> {
        if self.payment_status != PaymentStatus::Paid {
            return Some("Only paid bookings can be refunded");
        }
        if refund_amount_cents <= 0 || refund_amount_cents > self.total_price_cents {
            return Some("Refund amount exceeds the amount paid");
        }
        None
    }
}

pub fn reference_for_id(id: &uuid::Uuid) -> String {
    let hex = id.simple().to_string();
    let tail = &hex[hex.len() - 8..];
    format!("{}-{}", REFERENCE_PREFIX, tail.to_uppercase())
}

/// Whether two trip intervals `[start, start + duration)` overlap.
pub fn intervals_overlap(
    start_a: DateTime<Utc>,
    duration_a_minutes: i64,
    start_b: DateTime<Utc>,
    duration_b_minutes: i64,
) -> bool {
    let end_a = start_a + Duration::minutes(duration_a_minutes);
    let end_b = start_b + Duration::minutes(duration_b_minutes);
    start_a < end_b && start_b < end_a
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn booking_at(date_time: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            customer_name: "Jordan Reyes".to_string(),
            customer_email: "jordan@example.com".to_string(),
            customer_phone: "+15551234567".to_string(),
            service_type: ServiceType::CityRide,
            pickup_location: "12 Harbor St".to_string(),
            dropoff_location: "Union Station".to_string(),
            date_time,
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
            payment_method: None,
            booking_status: BookingStatus::Pending,
            driver_assigned: None,
            stripe_payment_intent_id: None,
            stripe_customer_id: None,
            admin_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            confirmed_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn reference_uses_last_8_hex_chars_uppercased() {
        let id = Uuid::parse_str("00000000-0000-0000-0000-0000deadbeef").unwrap();
        assert_eq!(reference_for_id(&id), "MFD-DEADBEEF");
    }

    #[test]
    fn self_cancel_allowed_just_outside_window() {
        let now = Utc::now();
        let booking = booking_at(now + Duration::hours(24) + Duration::seconds(1));
        assert_eq!(booking.self_cancellation_blocker(now), None);
    }

    #[test]
    fn self_cancel_rejected_just_inside_window() {
        let now = Utc::now();
        let booking = booking_at(now + Duration::hours(23) + Duration::minutes(59));
        assert!(booking.self_cancellation_blocker(now).is_some());
    }

    #[test]
    fn self_cancel_rejected_for_completed_booking() {
        let now = Utc::now();
        let mut booking = booking_at(now + Duration::hours(48));
        booking.booking_status = BookingStatus::Completed;
        assert!(booking.self_cancellation_blocker(now).is_some());
    }

    #[test]
    fn self_cancel_rejected_when_already_refunded() {
        let now = Utc::now();
        let mut booking = booking_at(now + Duration::hours(48));
        booking.payment_status = PaymentStatus::Refunded;
        assert!(booking.self_cancellation_blocker(now).is_some());
    }

    #[test]
    fn full_refund_of_a_paid_booking_is_allowed() {
        let mut booking = booking_at(Utc::now());
        booking.payment_status = PaymentStatus::Paid;
        assert_eq!(booking.refund_blocker(booking.total_price_cents), None);
    }

    #[test]
    fn refund_rejected_once_booking_is_refunded() {
        let mut booking = booking_at(Utc::now());
        booking.payment_status = PaymentStatus::Refunded;
        assert_eq!(
            booking.refund_blocker(booking.total_price_cents),
            Some("Only paid bookings can be refunded")
        );
    }

    #[test]
    fn refund_rejected_for_unpaid_booking() {
        let booking = booking_at(Utc::now());
        assert!(booking.refund_blocker(booking.total_price_cents).is_some());
    }

    #[test]
    fn refund_cannot_exceed_amount_collected() {
        let mut booking = booking_at(Utc::now());
        booking.payment_status = PaymentStatus::Paid;
        assert!(booking
            .refund_blocker(booking.total_price_cents + 1)
            .is_some());
        assert!(booking.refund_blocker(0).is_some());
        assert!(booking.refund_blocker(-100).is_some());
    }

    #[test]
    fn overlapping_intervals_detected() {
        let start = Utc::now();
        // 90 minutes apart with 120-minute durations: overlap
        assert!(intervals_overlap(
            start,
            120,
            start + Duration::minutes(90),
            120
        ));
        // Exactly 120 minutes apart: back-to-back, no overlap
        assert!(!intervals_overlap(
            start,
            120,
            start + Duration::minutes(120),
            120
        ));
        // Order of arguments does not matter
        assert!(intervals_overlap(
            start + Duration::minutes(90),
            120,
            start,
            120
        ));
    }
}
