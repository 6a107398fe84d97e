use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::header,
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::customerdb::CustomerExt,
    dtos::customerdtos::{
        CustomerData, CustomerListResponseDto, CustomerQueryDto, CustomerResponseDto,
        FilterCustomerDto, UpdateCustomerDto,
    },
    dtos::Pagination,
    error::HttpError,
    middleware::permission_check,
    models::{adminmodel::Permission, customermodel::Customer},
    utils::money,
    AppState,
};

pub fn customers_handler() -> Router {
    Router::new()
        .route("/", get(list_customers))
        .route("/export", get(export_customers))
        .route("/:customer_id", get(get_customer).put(update_customer))
        .layer(middleware::from_fn(|state, req, next| {
            permission_check(state, req, next, Permission::ManageCustomers)
        }))
}

pub async fn list_customers(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CustomerQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());

    let customers = app_state
        .db_client
        .get_customers(page as u32, limit, search)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let count = app_state
        .db_client
        .get_customer_count(search)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(CustomerListResponseDto {
        status: "success".to_string(),
        items: customers
            .iter()
            .map(FilterCustomerDto::filter_customer)
            .collect(),
        pagination: Pagination::new(page, limit, count),
    }))
}

pub async fn get_customer(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let customer = app_state
        .db_client
        .get_customer(Some(customer_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Customer not found".to_string()))?;

    Ok(Json(CustomerResponseDto {
        status: "success".to_string(),
        data: CustomerData {
            customer: FilterCustomerDto::filter_customer(&customer),
        },
    }))
}

pub async fn update_customer(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(customer_id): Path<Uuid>,
    Json(body): Json<UpdateCustomerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let customer = app_state
        .db_client
        .update_customer(
            customer_id,
            body.name,
            body.phone,
            body.address,
            body.city,
            body.country,
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => HttpError::not_found("Customer not found".to_string()),
            _ => HttpError::server_error(e.to_string()),
        })?;

    Ok(Json(CustomerResponseDto {
        status: "success".to_string(),
        data: CustomerData {
            customer: FilterCustomerDto::filter_customer(&customer),
        },
    }))
}

pub async fn export_customers(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let customers = app_state
        .db_client
        .get_all_customers()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let csv = render_customers_csv(&customers);

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"customers.csv\"",
        ),
    ];

    Ok((headers, csv))
}

fn render_customers_csv(customers: &[Customer]) -> String {
    let mut csv = String::from(
        "id,name,email,phone,total_bookings,completed_bookings,cancelled_bookings,\
         total_spent,loyalty_points,vip_status,tier,first_booking_date,last_booking_date\n",
    );

    for customer in customers {
        let row = [
            customer.id.to_string(),
            csv_field(&customer.name),
            csv_field(&customer.email),
            csv_field(&customer.phone),
            customer.total_bookings.to_string(),
            customer.completed_bookings.to_string(),
            customer.cancelled_bookings.to_string(),
            format!("{:.2}", money::from_cents(customer.total_spent_cents)),
            customer.loyalty_points.to_string(),
            customer.vip_status.to_string(),
            customer.tier().to_str().to_string(),
            customer
                .first_booking_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
            customer
                .last_booking_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
        ]
        .join(",");

        csv.push_str(&row);
        csv.push('\n');
    }

    csv
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("has,comma"), "\"has,comma\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
