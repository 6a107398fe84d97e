// Rate limiting for the public booking and contact endpoints.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

// Simple in-memory fixed-window limiter; per-process state only.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        let mut requests = self.requests.lock().unwrap();
        let now = Instant::now();

        // Sweep fully-expired clients so the map does not grow
        // without bound under rotating addresses.
        requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| now.duration_since(timestamp) < self.window);
            !timestamps.is_empty()
        });

        let entry = requests.entry(key.to_string()).or_insert_with(Vec::new);

        if entry.len() < self.max_requests {
            entry.push(now);
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let client_id = get_client_id(&request);

    if !limiter.is_allowed(&client_id) {
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(request).await)
}

fn get_client_id(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn public_rate_limiter() -> RateLimiter {
    RateLimiter::new(20, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(!limiter.is_allowed("1.2.3.4"));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("5.6.7.8"));
        assert!(!limiter.is_allowed("1.2.3.4"));
    }

    #[test]
    fn expired_clients_are_swept_from_the_map() {
        // A zero-length window expires every timestamp immediately,
        // so each call should sweep the previous caller's entry.
        let limiter = RateLimiter::new(2, Duration::from_secs(0));

        assert!(limiter.is_allowed("1.1.1.1"));
        assert!(limiter.is_allowed("2.2.2.2"));
        assert!(limiter.is_allowed("3.3.3.3"));

        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn live_clients_survive_the_sweep() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("5.6.7.8"));

        assert_eq!(limiter.tracked_clients(), 2);
    }
}
