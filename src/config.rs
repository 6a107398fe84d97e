#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Stripe configuration
    pub stripe_secret_key: String,
    pub stripe_publishable_key: String,
    pub stripe_webhook_secret: String,
    // Bootstrap credentials for the first super admin
    pub initial_admin_email: String,
    pub initial_admin_password: String,
    pub allowed_origins: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        // Stripe configuration (with test-mode defaults)
        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY")
            .unwrap_or_else(|_| "sk_test_placeholder".to_string());
        let stripe_publishable_key = std::env::var("STRIPE_PUBLISHABLE_KEY")
            .unwrap_or_else(|_| "pk_test_placeholder".to_string());
        let stripe_webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .unwrap_or_else(|_| "whsec_placeholder".to_string());

        let initial_admin_email = std::env::var("INITIAL_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@metrofleet.example".to_string());
        let initial_admin_password = std::env::var("INITIAL_ADMIN_PASSWORD")
            .unwrap_or_else(|_| "changeme123".to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string());

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            stripe_secret_key,
            stripe_publishable_key,
            stripe_webhook_secret,
            initial_admin_email,
            initial_admin_password,
            allowed_origins,
        }
    }
}
