use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::customermodel::Customer;

#[async_trait]
pub trait CustomerExt {
    async fn get_customer(
        &self,
        customer_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<Customer>, sqlx::Error>;

    /// Looks up the customer by email, creating the record on first
    /// contact. Contact fields are refreshed from the latest booking.
    async fn get_or_create_customer<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        phone: T,
    ) -> Result<Customer, sqlx::Error>;

    /// Counter bump for a freshly created booking: total_bookings and
    /// the first/last booking dates.
    async fn record_new_booking(&self, customer_id: Uuid) -> Result<Customer, sqlx::Error>;

    async fn get_customers(
        &self,
        page: u32,
        limit: usize,
        search: Option<&str>,
    ) -> Result<Vec<Customer>, sqlx::Error>;

    async fn get_customer_count(&self, search: Option<&str>) -> Result<i64, sqlx::Error>;

    async fn get_all_customers(&self) -> Result<Vec<Customer>, sqlx::Error>;

    async fn update_customer(
        &self,
        customer_id: Uuid,
        name: Option<String>,
        phone: Option<String>,
        address: Option<String>,
        city: Option<String>,
        country: Option<String>,
    ) -> Result<Customer, sqlx::Error>;

    async fn set_customer_stripe_id(
        &self,
        customer_id: Uuid,
        stripe_customer_id: &str,
    ) -> Result<Customer, sqlx::Error>;
}

#[async_trait]
impl CustomerExt for DBClient {
    async fn get_customer(
        &self,
        customer_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let mut customer: Option<Customer> = None;

        if let Some(customer_id) = customer_id {
            customer = sqlx::query_as::<_, Customer>(
                r#"
                SELECT
                    id, name, email, phone, address, city, country,
                    total_bookings, completed_bookings, cancelled_bookings,
                    total_spent_cents, loyalty_points, vip_status,
                    stripe_customer_id, first_booking_date, last_booking_date,
                    created_at, updated_at
                FROM customers
                WHERE id = $1
                "#,
            )
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            customer = sqlx::query_as::<_, Customer>(
                r#"
                SELECT
                    id, name, email, phone, address, city, country,
                    total_bookings, completed_bookings, cancelled_bookings,
                    total_spent_cents, loyalty_points, vip_status,
                    stripe_customer_id, first_booking_date, last_booking_date,
                    created_at, updated_at
                FROM customers
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(customer)
    }

    async fn get_or_create_customer<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        phone: T,
    ) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email, phone)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                updated_at = NOW()
            RETURNING
                id, name, email, phone, address, city, country,
                total_bookings, completed_bookings, cancelled_bookings,
                total_spent_cents, loyalty_points, vip_status,
                stripe_customer_id, first_booking_date, last_booking_date,
                created_at, updated_at
            "#,
        )
        .bind(name.into())
        .bind(email.into())
        .bind(phone.into())
        .fetch_one(&self.pool)
        .await
    }

    async fn record_new_booking(&self, customer_id: Uuid) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET total_bookings = total_bookings + 1,
                first_booking_date = COALESCE(first_booking_date, NOW()),
                last_booking_date = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, address, city, country,
                total_bookings, completed_bookings, cancelled_bookings,
                total_spent_cents, loyalty_points, vip_status,
                stripe_customer_id, first_booking_date, last_booking_date,
                created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_customers(
        &self,
        page: u32,
        limit: usize,
        search: Option<&str>,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;
        let pattern = search.map(|s| format!("%{}%", s));

        sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, email, phone, address, city, country,
                total_bookings, completed_bookings, cancelled_bookings,
                total_spent_cents, loyalty_points, vip_status,
                stripe_customer_id, first_booking_date, last_booking_date,
                created_at, updated_at
            FROM customers
            WHERE ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_customer_count(&self, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let pattern = search.map(|s| format!("%{}%", s));

        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM customers
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
            "#,
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, email, phone, address, city, country,
                total_bookings, completed_bookings, cancelled_bookings,
                total_spent_cents, loyalty_points, vip_status,
                stripe_customer_id, first_booking_date, last_booking_date,
                created_at, updated_at
            FROM customers
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn update_customer(
        &self,
        customer_id: Uuid,
        name: Option<String>,
        phone: Option<String>,
        address: Option<String>,
        city: Option<String>,
        country: Option<String>,
    ) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                city = COALESCE($5, city),
                country = COALESCE($6, country),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, address, city, country,
                total_bookings, completed_bookings, cancelled_bookings,
                total_spent_cents, loyalty_points, vip_status,
                stripe_customer_id, first_booking_date, last_booking_date,
                created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .bind(name)
        .bind(phone)
        .bind(address)
        .bind(city)
        .bind(country)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_customer_stripe_id(
        &self,
        customer_id: Uuid,
        stripe_customer_id: &str,
    ) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET stripe_customer_id = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, phone, address, city, country,
                total_bookings, completed_bookings, cancelled_bookings,
                total_spent_cents, loyalty_points, vip_status,
                stripe_customer_id, first_booking_date, last_booking_date,
                created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .bind(stripe_customer_id)
        .fetch_one(&self.pool)
        .await
    }
}
