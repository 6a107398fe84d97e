use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{models::customermodel::Customer, utils::money};

use super::Pagination;

#[derive(Serialize, Deserialize, Validate)]
pub struct CustomerQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    pub search: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateCustomerDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 30, message = "Phone number must be between 7-30 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterCustomerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub total_bookings: i32,
    pub completed_bookings: i32,
    pub cancelled_bookings: i32,
    pub total_spent: f64,
    pub loyalty_points: i32,
    pub vip_status: bool,
    pub tier: String,
    pub first_booking_date: Option<DateTime<Utc>>,
    pub last_booking_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterCustomerDto {
    pub fn filter_customer(customer: &Customer) -> Self {
        FilterCustomerDto {
            id: customer.id.to_string(),
            name: customer.name.to_owned(),
            email: customer.email.to_owned(),
            phone: customer.phone.to_owned(),
            address: customer.address.clone(),
            city: customer.city.clone(),
            country: customer.country.clone(),
            total_bookings: customer.total_bookings,
            completed_bookings: customer.completed_bookings,
            cancelled_bookings: customer.cancelled_bookings,
            total_spent: money::from_cents(customer.total_spent_cents),
            loyalty_points: customer.loyalty_points,
            vip_status: customer.vip_status,
            tier: customer.tier().to_str().to_string(),
            first_booking_date: customer.first_booking_date,
            last_booking_date: customer.last_booking_date,
            created_at: customer.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerData {
    pub customer: FilterCustomerDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponseDto {
    pub status: String,
    pub data: CustomerData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerListResponseDto {
    pub status: String,
    pub items: Vec<FilterCustomerDto>,
    pub pagination: Pagination,
}
