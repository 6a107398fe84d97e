use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::drivermodel::{
    AvailabilityStatus, Driver, DriverStatus, Vehicle, WorkingHours,
};

use super::Pagination;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateDriverDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 7, max = 30, message = "Phone number must be between 7-30 characters"))]
    pub phone: String,

    #[validate(length(min = 1, message = "License number is required"))]
    pub license_number: String,

    #[validate(length(min = 1, message = "At least one vehicle is required"))]
    pub vehicles: Vec<Vehicle>,
    pub working_hours: Option<WorkingHours>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateDriverDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 30, message = "Phone number must be between 7-30 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "License number is required"))]
    pub license_number: Option<String>,
    pub vehicles: Option<Vec<Vehicle>>,
    pub working_hours: Option<WorkingHours>,
    pub status: Option<DriverStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAvailabilityDto {
    pub availability_status: AvailabilityStatus,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RateDriverDto {
    #[validate(range(min = 1.0, max = 5.0, message = "Rating must be between 1 and 5"))]
    pub rating: f64,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct DriverQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    pub status: Option<DriverStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterDriverDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub vehicles: Vec<Vehicle>,
    pub working_hours: WorkingHours,
    pub availability_status: String,
    pub status: String,
    pub total_rides: i32,
    pub completed_rides: i32,
    pub cancelled_rides: i32,
    pub average_rating: f64,
    pub completion_rate: f64,
    pub cancellation_rate: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterDriverDto {
    pub fn filter_driver(driver: &Driver) -> Self {
        FilterDriverDto {
            id: driver.id.to_string(),
            name: driver.name.to_owned(),
            email: driver.email.to_owned(),
            phone: driver.phone.to_owned(),
            license_number: driver.license_number.to_owned(),
            vehicles: driver.vehicles.0.clone(),
            working_hours: driver.working_hours.0.clone(),
            availability_status: driver.availability_status.to_str().to_string(),
            status: driver.status.to_str().to_string(),
            total_rides: driver.total_rides,
            completed_rides: driver.completed_rides,
            cancelled_rides: driver.cancelled_rides,
            average_rating: driver.average_rating,
            completion_rate: driver.completion_rate(),
            cancellation_rate: driver.cancellation_rate(),
            created_at: driver.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverData {
    pub driver: FilterDriverDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverResponseDto {
    pub status: String,
    pub data: DriverData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverListResponseDto {
    pub status: String,
    pub items: Vec<FilterDriverDto>,
    pub pagination: Pagination,
}
