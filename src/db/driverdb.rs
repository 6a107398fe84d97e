use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::drivermodel::{
    AvailabilityStatus, Driver, DriverStatus, Vehicle, WorkingHours,
};

#[async_trait]
pub trait DriverExt {
    async fn get_driver(&self, driver_id: Uuid) -> Result<Option<Driver>, sqlx::Error>;

    async fn get_driver_by_email(&self, email: &str) -> Result<Option<Driver>, sqlx::Error>;

    async fn get_drivers(
        &self,
        page: u32,
        limit: usize,
        status: Option<DriverStatus>,
    ) -> Result<Vec<Driver>, sqlx::Error>;

    async fn get_driver_count(&self, status: Option<DriverStatus>) -> Result<i64, sqlx::Error>;

    async fn save_driver(
        &self,
        name: String,
        email: String,
        phone: String,
        license_number: String,
        vehicles: Vec<Vehicle>,
        working_hours: WorkingHours,
    ) -> Result<Driver, sqlx::Error>;

    async fn update_driver(
        &self,
        driver_id: Uuid,
        name: Option<String>,
        phone: Option<String>,
        license_number: Option<String>,
        vehicles: Option<Vec<Vehicle>>,
        working_hours: Option<WorkingHours>,
        status: Option<DriverStatus>,
    ) -> Result<Driver, sqlx::Error>;

    async fn update_driver_availability(
        &self,
        driver_id: Uuid,
        availability: AvailabilityStatus,
    ) -> Result<Driver, sqlx::Error>;

    async fn deactivate_driver(&self, driver_id: Uuid) -> Result<Driver, sqlx::Error>;

    /// Records a rating and folds it into the running weighted mean.
    async fn add_driver_rating(&self, driver_id: Uuid, rating: f64)
        -> Result<Driver, sqlx::Error>;
}

#[async_trait]
impl DriverExt for DBClient {
    async fn get_driver(&self, driver_id: Uuid) -> Result<Option<Driver>, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            SELECT
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            FROM drivers
            WHERE id = $1
            "#,
        )
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_driver_by_email(&self, email: &str) -> Result<Option<Driver>, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            SELECT
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            FROM drivers
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_drivers(
        &self,
        page: u32,
        limit: usize,
        status: Option<DriverStatus>,
    ) -> Result<Vec<Driver>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Driver>(
            r#"
            SELECT
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            FROM drivers
            WHERE ($3::driver_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_driver_count(&self, status: Option<DriverStatus>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM drivers
            WHERE ($1::driver_status IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn save_driver(
        &self,
        name: String,
        email: String,
        phone: String,
        license_number: String,
        vehicles: Vec<Vehicle>,
        working_hours: WorkingHours,
    ) -> Result<Driver, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (name, email, phone, license_number, vehicles, working_hours)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(license_number)
        .bind(Json(vehicles))
        .bind(Json(working_hours))
        .fetch_one(&self.pool)
        .await
    }

    async fn update_driver(
        &self,
        driver_id: Uuid,
        name: Option<String>,
        phone: Option<String>,
        license_number: Option<String>,
        vehicles: Option<Vec<Vehicle>>,
        working_hours: Option<WorkingHours>,
        status: Option<DriverStatus>,
    ) -> Result<Driver, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                license_number = COALESCE($4, license_number),
                vehicles = COALESCE($5, vehicles),
                working_hours = COALESCE($6, working_hours),
                status = COALESCE($7, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            "#,
        )
        .bind(driver_id)
        .bind(name)
        .bind(phone)
        .bind(license_number)
        .bind(vehicles.map(Json))
        .bind(working_hours.map(Json))
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_driver_availability(
        &self,
        driver_id: Uuid,
        availability: AvailabilityStatus,
    ) -> Result<Driver, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET availability_status = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            "#,
        )
        .bind(driver_id)
        .bind(availability)
        .fetch_one(&self.pool)
        .await
    }

    async fn deactivate_driver(&self, driver_id: Uuid) -> Result<Driver, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET status = 'inactive'::driver_status,
                availability_status = 'off_duty'::availability_status,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            "#,
        )
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn add_driver_rating(
        &self,
        driver_id: Uuid,
        rating: f64,
    ) -> Result<Driver, sqlx::Error> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET rating_sum = rating_sum + $2,
                rating_count = rating_count + 1,
                average_rating = (rating_sum + $2) / (rating_count + 1),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, license_number, vehicles, working_hours,
                availability_status, status, total_rides, completed_rides,
                cancelled_rides, rating_sum, rating_count, average_rating,
                created_at, updated_at
            "#,
        )
        .bind(driver_id)
        .bind(rating)
        .fetch_one(&self.pool)
        .await
    }
}
