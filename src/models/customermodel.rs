use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// VIP thresholds: lifetime spend in cents, or completed rides.
pub const VIP_SPEND_THRESHOLD_CENTS: i64 = 200_000;
pub const VIP_COMPLETED_THRESHOLD: i32 = 20;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl CustomerTier {
    pub fn to_str(&self) -> &str {
        match self {
            CustomerTier::Bronze => "bronze",
            CustomerTier::Silver => "silver",
            CustomerTier::Gold => "gold",
            CustomerTier::Platinum => "platinum",
        }
    }

    /// Tier is stepped purely off lifetime spend, recomputed on read.
    pub fn from_total_spent_cents(cents: i64) -> CustomerTier {
        if cents >= 500_000 {
            CustomerTier::Platinum
        } else if cents >= 200_000 {
            CustomerTier::Gold
        } else if cents >= 50_000 {
            CustomerTier::Silver
        } else {
            CustomerTier::Bronze
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Customer {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub total_bookings: i32,
    pub completed_bookings: i32,
    pub cancelled_bookings: i32,
    pub total_spent_cents: i64,
    pub loyalty_points: i32,
    pub vip_status: bool,
    pub stripe_customer_id: Option<String>,
    pub first_booking_date: Option<DateTime<Utc>>,
    pub last_booking_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn tier(&self) -> CustomerTier {
        CustomerTier::from_total_spent_cents(self.total_spent_cents)
    }

    pub fn qualifies_for_vip(&self) -> bool {
        self.total_spent_cents >= VIP_SPEND_THRESHOLD_CENTS
            || self.completed_bookings >= VIP_COMPLETED_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(
            CustomerTier::from_total_spent_cents(49_999),
            CustomerTier::Bronze
        );
        assert_eq!(
            CustomerTier::from_total_spent_cents(50_000),
            CustomerTier::Silver
        );
        assert_eq!(
            CustomerTier::from_total_spent_cents(200_000),
            CustomerTier::Gold
        );
        assert_eq!(
            CustomerTier::from_total_spent_cents(500_000),
            CustomerTier::Platinum
        );
    }

    #[test]
    fn vip_thresholds() {
        let mut customer = Customer {
            id: uuid::Uuid::new_v4(),
            name: "Dana Wells".to_string(),
            email: "dana@example.com".to_string(),
            phone: "+15550001111".to_string(),
            address: None,
            city: None,
            country: None,
            total_bookings: 5,
            completed_bookings: 4,
            cancelled_bookings: 1,
            total_spent_cents: 150_000,
            loyalty_points: 150,
            vip_status: false,
            stripe_customer_id: None,
            first_booking_date: None,
            last_booking_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!customer.qualifies_for_vip());

        customer.total_spent_cents = 200_000;
        assert!(customer.qualifies_for_vip());

        customer.total_spent_cents = 0;
        customer.completed_bookings = 20;
        assert!(customer.qualifies_for_vip());
    }
}
