use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        admins::admins_handler,
        auth::auth_handler,
        bookings::{
            bookings_handler, create_booking, lookup_booking_by_reference, self_cancel_booking,
        },
        customers::customers_handler,
        drivers::drivers_handler,
        messages::{create_message, messages_handler},
        payments::{create_payment_intent, payments_handler, stripe_webhook},
    },
    middleware::{
        auth,
        rate_limit::{public_rate_limiter, rate_limit_middleware},
    },
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let limiter = Arc::new(public_rate_limiter());

    // Public booking endpoints: creation is rate-limited, lookup and
    // self-service cancellation are authenticated by matching email.
    let public_booking_routes = Router::new()
        .route(
            "/",
            post(create_booking).layer(middleware::from_fn_with_state(
                limiter.clone(),
                rate_limit_middleware,
            )),
        )
        .route("/:booking_id/cancel", post(self_cancel_booking))
        .route("/reference/:reference", get(lookup_booking_by_reference));

    let booking_routes = Router::new()
        .merge(public_booking_routes)
        .merge(bookings_handler().layer(middleware::from_fn(auth)));

    let message_routes = Router::new()
        .route(
            "/",
            post(create_message).layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            )),
        )
        .merge(messages_handler().layer(middleware::from_fn(auth)));

    // The webhook authenticates by signature, intent creation by
    // booking email; the refund route requires a staff token.
    let payment_routes = Router::new()
        .route("/create-intent", post(create_payment_intent))
        .route("/webhook", post(stripe_webhook))
        .merge(payments_handler().layer(middleware::from_fn(auth)));

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/admin", admins_handler().layer(middleware::from_fn(auth)))
        .nest("/bookings", booking_routes)
        .nest(
            "/customers",
            customers_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/drivers",
            drivers_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/messages", message_routes)
        .nest("/payments", payment_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{body::Body, http::Request, http::StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use crate::{config::Config, db::db::DBClient, service::stripe::StripeService};

    fn test_state() -> Arc<AppState> {
        let config = Config {
            database_url: "postgres://localhost/unused".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            stripe_secret_key: "sk_test_x".to_string(),
            stripe_publishable_key: "pk_test_x".to_string(),
            stripe_webhook_secret: "whsec_x".to_string(),
            initial_admin_email: "admin@example.com".to_string(),
            initial_admin_password: "changeme123".to_string(),
            allowed_origins: "http://localhost:5173".to_string(),
        };

        // Lazy pool: no connection is made until a query runs, which
        // the routes below never do.
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        let stripe_service = Arc::new(StripeService::new(&config));

        Arc::new(AppState {
            env: config,
            db_client: Arc::new(DBClient::new(pool)),
            stripe_service,
        })
    }

    #[tokio::test]
    async fn health_check_responds_ok() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn staff_routes_reject_missing_token() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/bookings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_rejects_missing_signature() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/payments/webhook")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
