use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    models::bookingmodel::{Booking, BookingStatus, PaymentStatus, ServiceType},
    utils::money,
};

use super::Pagination;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub customer_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub customer_email: String,

    #[validate(length(min = 7, max = 30, message = "Phone number must be between 7-30 characters"))]
    pub customer_phone: String,

    pub service_type: ServiceType,

    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,

    #[validate(length(min = 1, message = "Dropoff location is required"))]
    pub dropoff_location: String,

    pub date_time: DateTime<Utc>,

    pub flight_number: Option<String>,
    pub train_number: Option<String>,

    #[validate(range(min = 1, max = 16, message = "Passenger count must be between 1 and 16"))]
    pub passenger_count: Option<i32>,

    pub notes: Option<String>,

    #[validate(range(min = 0.0, message = "Base price cannot be negative"))]
    pub base_price: f64,

    #[validate(range(min = 0.0, message = "Additional fees cannot be negative"))]
    pub additional_fees: Option<f64>,

    pub currency: Option<String>,

    #[validate(range(min = 15, max = 1440, message = "Duration must be between 15 and 1440 minutes"))]
    pub estimated_duration_minutes: Option<i32>,
}

impl CreateBookingDto {
    /// Prices in cents as stored: `(base, fees, total)`. The total is
    /// always base + fees; missing fees count as zero.
    pub fn price_cents(&self) -> (i64, i64, i64) {
        let base = money::to_cents(self.base_price);
        let fees = money::to_cents(self.additional_fees.unwrap_or(0.0));
        (base, fees, base + fees)
    }

    pub fn validate_date_in_future(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.date_time <= now {
            let mut error = ValidationError::new("date_in_past");
            error.message = Some(Cow::from("Booking date must be in the future"));
            return Err(error);
        }
        Ok(())
    }

    pub fn validate_phone_number(&self) -> Result<(), ValidationError> {
        let phone_regex = regex::Regex::new(r"^\+?[0-9][0-9 \-()]{5,28}$")
            .map_err(|_| ValidationError::new("invalid_phone_regex"))?;

        if !phone_regex.is_match(&self.customer_phone) {
            let mut error = ValidationError::new("invalid_phone");
            error.message = Some(Cow::from(
                "Phone number must be in a valid format (e.g., +1234567890)",
            ));
            return Err(error);
        }
        Ok(())
    }

    /// flight_number is required iff airport pickup, train_number iff
    /// train pickup.
    pub fn validate_service_fields(&self) -> Result<(), ValidationError> {
        match self.service_type {
            ServiceType::AirportPickup => {
                if self
                    .flight_number
                    .as_deref()
                    .map_or(true, |f| f.trim().is_empty())
                {
                    let mut error = ValidationError::new("flight_number_required");
                    error.message =
                        Some(Cow::from("Flight number is required for airport pickups"));
                    return Err(error);
                }
            }
            ServiceType::TrainPickup => {
                if self
                    .train_number
                    .as_deref()
                    .map_or(true, |t| t.trim().is_empty())
                {
                    let mut error = ValidationError::new("train_number_required");
                    error.message = Some(Cow::from("Train number is required for train pickups"));
                    return Err(error);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusDto {
    pub booking_status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    #[validate(length(max = 2000, message = "Notes must not exceed 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignDriverDto {
    pub driver_id: Uuid,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CancelBookingDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    pub reason: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct StaffCancelBookingDto {
    #[validate(length(max = 500, message = "Reason must not exceed 500 characters"))]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct BookingQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    pub booking_status: Option<BookingStatus>,
    pub service_type: Option<ServiceType>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct ReferenceLookupDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterBookingDto {
    pub id: String,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub service_type: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub date_time: DateTime<Utc>,
    pub flight_number: Option<String>,
    pub train_number: Option<String>,
    pub passenger_count: i32,
    pub notes: Option<String>,
    pub base_price: f64,
    pub additional_fees: f64,
    pub total_price: f64,
    pub currency: String,
    pub estimated_duration_minutes: i32,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub booking_status: String,
    pub driver_assigned: Option<String>,
    pub admin_notes: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FilterBookingDto {
    pub fn filter_booking(booking: &Booking) -> Self {
        FilterBookingDto {
            id: booking.id.to_string(),
            reference: booking.reference(),
            customer_name: booking.customer_name.to_owned(),
            customer_email: booking.customer_email.to_owned(),
            customer_phone: booking.customer_phone.to_owned(),
            service_type: booking.service_type.to_str().to_string(),
            pickup_location: booking.pickup_location.to_owned(),
            dropoff_location: booking.dropoff_location.to_owned(),
            date_time: booking.date_time,
            flight_number: booking.flight_number.clone(),
            train_number: booking.train_number.clone(),
            passenger_count: booking.passenger_count,
            notes: booking.notes.clone(),
            base_price: money::from_cents(booking.base_price_cents),
            additional_fees: money::from_cents(booking.additional_fees_cents),
            total_price: money::from_cents(booking.total_price_cents),
            currency: booking.currency.clone(),
            estimated_duration_minutes: booking.estimated_duration_minutes,
            payment_status: booking.payment_status.to_str().to_string(),
            payment_method: booking.payment_method.clone(),
            booking_status: booking.booking_status.to_str().to_string(),
            driver_assigned: booking.driver_assigned.map(|id| id.to_string()),
            admin_notes: booking.admin_notes.clone(),
            created_at: booking.created_at,
            confirmed_at: booking.confirmed_at,
            completed_at: booking.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingData {
    pub booking: FilterBookingDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponseDto {
    pub status: String,
    pub data: BookingData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingListResponseDto {
    pub status: String,
    pub items: Vec<FilterBookingDto>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_dto(service_type: ServiceType) -> CreateBookingDto {
        CreateBookingDto {
            customer_name: "Jordan Reyes".to_string(),
            customer_email: "jordan@example.com".to_string(),
            customer_phone: "+15551234567".to_string(),
            service_type,
            pickup_location: "12 Harbor St".to_string(),
            dropoff_location: "Union Station".to_string(),
            date_time: Utc::now() + Duration::days(2),
            flight_number: None,
            train_number: None,
            passenger_count: Some(2),
            notes: None,
            base_price: 120.0,
            additional_fees: Some(5.0),
            currency: None,
            estimated_duration_minutes: None,
        }
    }

    #[test]
    fn airport_pickup_requires_flight_number() {
        let mut dto = base_dto(ServiceType::AirportPickup);
        assert!(dto.validate_service_fields().is_err());

        dto.flight_number = Some("BA117".to_string());
        assert!(dto.validate_service_fields().is_ok());
    }

    #[test]
    fn train_pickup_requires_train_number() {
        let mut dto = base_dto(ServiceType::TrainPickup);
        assert!(dto.validate_service_fields().is_err());

        dto.train_number = Some("ICE 1537".to_string());
        assert!(dto.validate_service_fields().is_ok());
    }

    #[test]
    fn city_ride_needs_no_service_fields() {
        let dto = base_dto(ServiceType::CityRide);
        assert!(dto.validate_service_fields().is_ok());
    }

    #[test]
    fn total_price_is_base_plus_fees() {
        let dto = base_dto(ServiceType::CityRide);
        assert_eq!(dto.price_cents(), (12000, 500, 12500));
    }

    #[test]
    fn missing_fees_leave_total_equal_to_base() {
        let mut dto = base_dto(ServiceType::CityRide);
        dto.additional_fees = None;
        let (base, fees, total) = dto.price_cents();
        assert_eq!(fees, 0);
        assert_eq!(total, base);
    }

    #[test]
    fn past_pickup_time_is_rejected() {
        let now = Utc::now();
        let mut dto = base_dto(ServiceType::CityRide);
        dto.date_time = now - Duration::minutes(1);
        assert!(dto.validate_date_in_future(now).is_err());
    }

    #[test]
    fn pickup_time_just_ahead_is_accepted() {
        let now = Utc::now();
        let mut dto = base_dto(ServiceType::CityRide);
        dto.date_time = now + Duration::seconds(1);
        assert!(dto.validate_date_in_future(now).is_ok());
    }

    #[test]
    fn phone_format_is_checked() {
        let mut dto = base_dto(ServiceType::CityRide);
        assert!(dto.validate_phone_number().is_ok());

        dto.customer_phone = "not-a-phone".to_string();
        assert!(dto.validate_phone_number().is_err());
    }

    #[test]
    fn derive_validation_catches_negative_price() {
        let mut dto = base_dto(ServiceType::CityRide);
        dto.base_price = -10.0;
        assert!(dto.validate().is_err());
    }
}
