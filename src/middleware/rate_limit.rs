use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Fixed one-second window shared by a route group. Coarse on purpose: each
/// group gets one counter, not one per client.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_per_second: u32,
    window: Arc<Mutex<(Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(max_per_second: u32) -> Self {
        Self {
            max_per_second: max_per_second.max(1),
            window: Arc::new(Mutex::new((Instant::now(), 0))),
        }
    }

    fn try_acquire(&self) -> bool {
        let mut guard = self.window.lock().expect("rate limiter mutex poisoned");
        let (ref mut started, ref mut used) = *guard;
        if started.elapsed() >= Duration::from_secs(1) {
            *started = Instant::now();
            *used = 0;
        }
        if *used < self.max_per_second {
            *used += 1;
            true
        } else {
            false
        }
    }
}

pub async fn rps_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.try_acquire() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_rejects_past_the_limit_and_recovers() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        // force the window to look expired
        {
            let mut guard = limiter.window.lock().unwrap();
            guard.0 = Instant::now() - Duration::from_secs(2);
        }
        assert!(limiter.try_acquire());
    }
}
