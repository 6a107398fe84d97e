use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::adminmodel::{Admin, AdminRole};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginAdminDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    pub role: AdminRole,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAdminDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub role: Option<AdminRole>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(
        length(min = 1, message = "New password is required"),
        length(min = 6, message = "New password must be at least 6 characters")
    )]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterAdminDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterAdminDto {
    pub fn filter_admin(admin: &Admin) -> Self {
        FilterAdminDto {
            id: admin.id.to_string(),
            name: admin.name.to_owned(),
            email: admin.email.to_owned(),
            role: admin.role.to_str().to_string(),
            permissions: admin.permissions.clone(),
            is_active: admin.is_active,
            last_login_at: admin.last_login_at,
            created_at: admin.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminData {
    pub admin: FilterAdminDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminResponseDto {
    pub status: String,
    pub data: AdminData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminListResponseDto {
    pub status: String,
    pub admins: Vec<FilterAdminDto>,
    pub results: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponseDto {
    pub status: String,
    pub token: String,
}
