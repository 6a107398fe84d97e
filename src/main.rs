mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::config::Config;
use crate::db::admindb::AdminExt;
use crate::db::db::DBClient;
use crate::models::adminmodel::AdminRole;
use crate::routes::create_router;
use crate::service::stripe::StripeService;
use crate::utils::password;

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub stripe_service: Arc<StripeService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let stripe_service = Arc::new(StripeService::new(&config));

        Self {
            env: config,
            db_client: Arc::new(db_client),
            stripe_service,
        }
    }
}

/// Seeds the first super admin from the configured bootstrap
/// credentials when the admins table is empty.
async fn bootstrap_initial_admin(db_client: &DBClient, config: &Config) {
    let count = match db_client.get_admin_count().await {
        Ok(count) => count,
        Err(err) => {
            tracing::error!("failed to check admin count: {}", err);
            return;
        }
    };

    if count > 0 {
        return;
    }

    let hashed = match password::hash(config.initial_admin_password.clone()) {
        Ok(hashed) => hashed,
        Err(err) => {
            tracing::error!("failed to hash bootstrap admin password: {}", err);
            return;
        }
    };

    match db_client
        .save_admin(
            "Super Admin".to_string(),
            config.initial_admin_email.clone(),
            hashed,
            AdminRole::SuperAdmin,
            vec![],
        )
        .await
    {
        Ok(admin) => {
            tracing::info!("bootstrap super admin created: {}", admin.email);
        }
        Err(err) => {
            tracing::error!("failed to create bootstrap super admin: {}", err);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!().run(&pool).await {
        tracing::error!("failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let db_client = DBClient::new(pool);

    bootstrap_initial_admin(&db_client, &config).await;

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind to port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server error: {:?}", err);
    }
}
