use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    used: u32,
}

/// Fixed one-second window shared by every route the layer wraps.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    pub fn per_second(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                used: 0,
            })),
        }
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let mut window = self.window.lock().unwrap_or_else(|p| p.into_inner());
        if now.duration_since(window.opened_at) >= WINDOW {
            window.opened_at = now;
            window.used = 0;
        }
        if window.used >= self.limit {
            return false;
        }
        window.used += 1;
        true
    }

    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.try_acquire() {
        tracing::warn!(path = %req.uri().path(), "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "rate_limit_exceeded" })),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::per_second(2);
        let start = Instant::now();
        assert!(limiter.try_acquire_at(start));
        assert!(limiter.try_acquire_at(start));
        assert!(!limiter.try_acquire_at(start + Duration::from_millis(500)));
    }

    #[test]
    fn window_resets_after_a_second() {
        let limiter = RateLimiter::per_second(1);
        let start = Instant::now();
        assert!(limiter.try_acquire_at(start));
        assert!(!limiter.try_acquire_at(start));
        assert!(limiter.try_acquire_at(start + WINDOW));
    }

    #[test]
    fn zero_limit_still_admits_one_request() {
        let limiter = RateLimiter::per_second(0);
        assert!(limiter.try_acquire());
    }
}
