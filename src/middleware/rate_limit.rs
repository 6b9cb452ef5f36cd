//! Per-IP request rate limiting
//!
//! The counter store is an explicit [`RateLimiter`] value held in
//! [`ServerState`](crate::core::ServerState) and passed to the middleware,
//! not process-global state — swapping it for a distributed backing store
//! would not touch any call site. Counters live in memory only and do not
//! survive a restart.

use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::core::ServerState;

/// Window length for every counter
const WINDOW: Duration = Duration::from_secs(60);

/// Default per-window limit for state-changing API calls
const DEFAULT_LIMIT: u32 = 60;

/// Order submission is deliberately tight (order spam)
const ORDERS_LIMIT: u32 = 10;

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

/// Windowed per-key counter store with reset-on-expiry
#[derive(Debug)]
pub struct RateLimiter {
    entries: DashMap<String, WindowEntry>,
    window: Duration,
}

impl std::fmt::Debug for WindowEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowEntry")
            .field("count", &self.count)
            .finish()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_window(WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            window,
        }
    }

    /// Count one request for `key`. Returns false once the key exceeds
    /// `limit` within the current window; an expired window resets first.
    pub fn check(&self, key: &str, limit: u32) -> bool {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) > self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= limit
    }

    /// Drop the counter for `key`
    pub fn reset(&self, key: &str) {
        self.entries.remove(key);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Limit applied to a request path, or None when exempt
fn limit_for(path: &str) -> Option<u32> {
    // Mass photo uploads are a normal customer session; never throttled
    if path.starts_with("/api/upload") {
        return None;
    }
    if path.starts_with("/api/orders") {
        return Some(ORDERS_LIMIT);
    }
    Some(DEFAULT_LIMIT)
}

/// Axum middleware: throttle state-changing API calls per client address
pub async fn rate_limit(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !state.config.rate_limit_enabled || !path.starts_with("/api") {
        return next.run(request).await;
    }

    // Reads are cheap or cached; only write operations are throttled
    let method = request.method();
    if method != Method::POST && method != Method::PUT && method != Method::DELETE {
        return next.run(request).await;
    }

    let Some(limit) = limit_for(path) else {
        return next.run(request).await;
    };

    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    if !state.rate_limiter.check(&ip, limit) {
        tracing::warn!(ip = %ip, path = %path, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "Too many requests. Please try again later."
            })),
        )
            .into_response();
    }

    next.run(request).await
}
