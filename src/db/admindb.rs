use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;

use crate::models::adminmodel::{Admin, AdminRole};

#[async_trait]
pub trait AdminExt {
    async fn get_admin(
        &self,
        admin_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<Admin>, sqlx::Error>;

    async fn get_admins(&self, page: u32, limit: usize) -> Result<Vec<Admin>, sqlx::Error>;

    async fn get_admin_count(&self) -> Result<i64, sqlx::Error>;

    async fn save_admin<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        password: T,
        role: AdminRole,
        permissions: Vec<String>,
    ) -> Result<Admin, sqlx::Error>;

    async fn update_admin(
        &self,
        admin_id: Uuid,
        name: Option<String>,
        role: Option<AdminRole>,
        permissions: Option<Vec<String>>,
    ) -> Result<Admin, sqlx::Error>;

    async fn update_admin_password(
        &self,
        admin_id: Uuid,
        password: String,
    ) -> Result<Admin, sqlx::Error>;

    async fn deactivate_admin(&self, admin_id: Uuid) -> Result<Admin, sqlx::Error>;

    async fn record_admin_login(&self, admin_id: Uuid) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl AdminExt for DBClient {
    async fn get_admin(
        &self,
        admin_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<Admin>, sqlx::Error> {
        let mut admin: Option<Admin> = None;

        if let Some(admin_id) = admin_id {
            admin = sqlx::query_as::<_, Admin>(
                r#"
                SELECT
                    id, name, email, password, role, permissions,
                    is_active, last_login_at, created_at, updated_at
                FROM admins
                WHERE id = $1
                "#,
            )
            .bind(admin_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            admin = sqlx::query_as::<_, Admin>(
                r#"
                SELECT
                    id, name, email, password, role, permissions,
                    is_active, last_login_at, created_at, updated_at
                FROM admins
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(admin)
    }

    async fn get_admins(&self, page: u32, limit: usize) -> Result<Vec<Admin>, sqlx::Error> {
        let offset = (page - 1) as i64 * limit as i64;

        sqlx::query_as::<_, Admin>(
            r#"
            SELECT
                id, name, email, password, role, permissions,
                is_active, last_login_at, created_at, updated_at
            FROM admins
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_admin_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM admins"#)
            .fetch_one(&self.pool)
            .await
    }

    async fn save_admin<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        password: T,
        role: AdminRole,
        permissions: Vec<String>,
    ) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (name, email, password, role, permissions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id, name, email, password, role, permissions,
                is_active, last_login_at, created_at, updated_at
            "#,
        )
        .bind(name.into())
        .bind(email.into())
        .bind(password.into())
        .bind(role)
        .bind(permissions)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_admin(
        &self,
        admin_id: Uuid,
        name: Option<String>,
        role: Option<AdminRole>,
        permissions: Option<Vec<String>>,
    ) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            UPDATE admins
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                permissions = COALESCE($4, permissions),
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, password, role, permissions,
                is_active, last_login_at, created_at, updated_at
            "#,
        )
        .bind(admin_id)
        .bind(name)
        .bind(role)
        .bind(permissions)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_admin_password(
        &self,
        admin_id: Uuid,
        password: String,
    ) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            UPDATE admins
            SET password = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, password, role, permissions,
                is_active, last_login_at, created_at, updated_at
            "#,
        )
        .bind(admin_id)
        .bind(password)
        .fetch_one(&self.pool)
        .await
    }

    async fn deactivate_admin(&self, admin_id: Uuid) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            UPDATE admins
            SET is_active = FALSE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, name, email, password, role, permissions,
                is_active, last_login_at, created_at, updated_at
            "#,
        )
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn record_admin_login(&self, admin_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE admins SET last_login_at = NOW() WHERE id = $1"#)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
