//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// State for rate limiting.
#[derive(Clone)]
pub struct RateLimitState {
    /// Per-IP rate limiters for the passcode-send endpoint.
    passcode_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Per-IP rate limiters for the general API.
    api_limiters: Arc<RwLock<HashMap<String, Arc<IpRateLimiter>>>>,
    /// Passcode-send rate limit (requests per minute).
    passcode_rate_limit: u32,
    /// API rate limit (requests per minute).
    api_rate_limit: u32,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(passcode_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            passcode_limiters: Arc::new(RwLock::new(HashMap::new())),
            api_limiters: Arc::new(RwLock::new(HashMap::new())),
            passcode_rate_limit,
            api_rate_limit,
        }
    }

    /// Get or create a rate limiter for the given IP.
    fn get_or_create_limiter(
        limiters: &RwLock<HashMap<String, Arc<IpRateLimiter>>>,
        ip: &str,
        requests_per_minute: u32,
    ) -> Arc<IpRateLimiter> {
        {
            let read_guard = limiters.read().unwrap();
            if let Some(limiter) = read_guard.get(ip) {
                return limiter.clone();
            }
        }

        let mut write_guard = limiters.write().unwrap();

        // Double-check after acquiring the write lock
        if let Some(limiter) = write_guard.get(ip) {
            return limiter.clone();
        }

        let quota =
            Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        write_guard.insert(ip.to_string(), limiter.clone());
        limiter
    }

    /// Check if a passcode-send request is allowed.
    pub fn check_passcode(&self, ip: &str) -> bool {
        let limiter =
            Self::get_or_create_limiter(&self.passcode_limiters, ip, self.passcode_rate_limit);
        limiter.check().is_ok()
    }

    /// Check if a general API request is allowed.
    pub fn check_api(&self, ip: &str) -> bool {
        let limiter = Self::get_or_create_limiter(&self.api_limiters, ip, self.api_rate_limit);
        limiter.check().is_ok()
    }

    /// Drop limiters no longer referenced elsewhere.
    pub fn cleanup(&self) {
        let mut passcode_guard = self.passcode_limiters.write().unwrap();
        passcode_guard.retain(|_, v| Arc::strong_count(v) > 1);

        let mut api_guard = self.api_limiters.write().unwrap();
        api_guard.retain(|_, v| Arc::strong_count(v) > 1);
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(300)).await;
                self.cleanup();
            }
        });
    }
}

/// Extract the client IP from a request.
fn client_ip(req: &Request<Body>) -> String {
    // X-Forwarded-For first (reverse proxy), first hop wins
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware guarding the passcode-send endpoint.
pub async fn passcode_rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);

    if !state.rate_limits.check_passcode(&ip) {
        tracing::warn!("Passcode rate limit hit for {}", ip);
        return ApiError::too_many_requests("Too many passcode requests, try again later")
            .into_response();
    }

    next.run(req).await
}
