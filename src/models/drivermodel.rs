use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "availability_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Busy,
    OffDuty,
}

impl AvailabilityStatus {
    pub fn to_str(&self) -> &str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Busy => "busy",
            AvailabilityStatus::OffDuty => "off_duty",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Active,
    Inactive,
    Suspended,
    OnLeave,
}

impl DriverStatus {
    pub fn to_str(&self) -> &str {
        match self {
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
            DriverStatus::Suspended => "suspended",
            DriverStatus::OnLeave => "on_leave",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub plate_number: String,
    pub color: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DaySchedule {
    pub available: bool,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct WorkingHours {
    #[serde(default)]
    pub monday: DaySchedule,
    #[serde(default)]
    pub tuesday: DaySchedule,
    #[serde(default)]
    pub wednesday: DaySchedule,
    #[serde(default)]
    pub thursday: DaySchedule,
    #[serde(default)]
    pub friday: DaySchedule,
    #[serde(default)]
    pub saturday: DaySchedule,
    #[serde(default)]
    pub sunday: DaySchedule,
}

impl WorkingHours {
    /// Seven-day 08:00-20:00 schedule, used when a driver is created
    /// without explicit working hours.
    pub fn full_week() -> WorkingHours {
        let day = DaySchedule {
            available: true,
            start: Some("08:00".to_string()),
            end: Some("20:00".to_string()),
        };
        WorkingHours {
            monday: day.clone(),
            tuesday: day.clone(),
            wednesday: day.clone(),
            thursday: day.clone(),
            friday: day.clone(),
            saturday: day.clone(),
            sunday: day,
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn is_available_on(&self, weekday: Weekday) -> bool {
        self.day(weekday).available
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Driver {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub vehicles: Json<Vec<Vehicle>>,
    pub working_hours: Json<WorkingHours>,
    pub availability_status: AvailabilityStatus,
    pub status: DriverStatus,
    pub total_rides: i32,
    pub completed_rides: i32,
    pub cancelled_rides: i32,
    pub rating_sum: f64,
    pub rating_count: i32,
    pub average_rating: f64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    pub fn primary_vehicle(&self) -> Option<&Vehicle> {
        self.vehicles
            .0
            .iter()
            .find(|v| v.is_primary)
            .or_else(|| self.vehicles.0.first())
    }

    /// Ratio of completed rides, 0 when no rides were taken.
    pub fn completion_rate(&self) -> f64 {
        rate(self.completed_rides, self.total_rides)
    }

    pub fn cancellation_rate(&self) -> f64 {
        rate(self.cancelled_rides, self.total_rides)
    }
}

fn rate(part: i32, total: i32) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    part as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_zero_without_rides() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(5, 0), 0.0);
    }

    #[test]
    fn rates_are_simple_ratios() {
        assert_eq!(rate(3, 4), 0.75);
        assert_eq!(rate(1, 4), 0.25);
    }

    #[test]
    fn working_hours_weekday_lookup() {
        let mut hours = WorkingHours::default();
        hours.monday.available = true;
        hours.saturday.available = false;

        assert!(hours.is_available_on(Weekday::Mon));
        assert!(!hours.is_available_on(Weekday::Sat));
        assert!(!hours.is_available_on(Weekday::Sun));
    }

    #[test]
    fn primary_vehicle_falls_back_to_first() {
        let vehicles = vec![
            Vehicle {
                make: "Mercedes".to_string(),
                model: "S-Class".to_string(),
                year: 2022,
                plate_number: "MF-100".to_string(),
                color: Some("black".to_string()),
                is_primary: false,
            },
            Vehicle {
                make: "BMW".to_string(),
                model: "7 Series".to_string(),
                year: 2023,
                plate_number: "MF-200".to_string(),
                color: None,
                is_primary: true,
            },
        ];

        let driver = Driver {
            id: uuid::Uuid::new_v4(),
            name: "Sam Ito".to_string(),
            email: "sam@metrofleet.example".to_string(),
            phone: "+15558887777".to_string(),
            license_number: "D1234567".to_string(),
            vehicles: Json(vehicles),
            working_hours: Json(WorkingHours::default()),
            availability_status: AvailabilityStatus::Available,
            status: DriverStatus::Active,
            total_rides: 0,
            completed_rides: 0,
            cancelled_rides: 0,
            rating_sum: 0.0,
            rating_count: 0,
            average_rating: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(driver.primary_vehicle().unwrap().plate_number, "MF-200");
    }
}
