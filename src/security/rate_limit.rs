//! Sliding-window rate limiting per client IP.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// Result of admitting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the oldest request in the window expires.
    pub reset_after: Duration,
}

/// Per-client log of request instants inside the window.
pub struct RateLimiter {
    windows: DashMap<IpAddr, VecDeque<Instant>>,
    max_requests: u32,
    window: Duration,
    path_prefix: String,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests: config.max_requests,
            window: config.window(),
            path_prefix: config.path_prefix.clone(),
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.enabled && path.starts_with(&self.path_prefix)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, client: IpAddr) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    /// Admit or reject a request from `client` arriving at `now`.
    ///
    /// Rejected requests are not recorded, so a client hammering the
    /// gateway regains access once its admitted requests age out.
    pub fn check_at(&self, client: IpAddr, now: Instant) -> RateDecision {
        let mut hits = self.windows.entry(client).or_default();
        while let Some(&oldest) = hits.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }

        let allowed = (hits.len() as u32) < self.max_requests;
        if allowed {
            hits.push_back(now);
        }

        let reset_after = hits
            .front()
            .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(self.window);

        RateDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(hits.len() as u32),
            reset_after,
        }
    }

    /// Drop clients whose whole window has expired. Returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        let window = self.window;
        self.windows.retain(|_, hits| {
            hits.back()
                .map(|&newest| now.saturating_duration_since(newest) < window)
                .unwrap_or(false)
        });
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Middleware: throttle requests under the configured prefix.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.applies_to(request.uri().path()) {
        return next.run(request).await;
    }

    let client = client_ip(&request);
    let decision = limiter.check(client);

    if !decision.allowed {
        tracing::warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited();
        let mut response = ApiError::RateLimited.into_response();
        write_headers(response.headers_mut(), &decision);
        response.headers_mut().insert(
            axum::http::header::RETRY_AFTER,
            HeaderValue::from(decision.reset_after.as_secs().max(1)),
        );
        return response;
    }

    let mut response = next.run(request).await;
    write_headers(response.headers_mut(), &decision);
    response
}

fn client_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn write_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert("ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "ratelimit-reset",
        HeaderValue::from(decision.reset_after.as_secs()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_requests: max,
            window_secs: 60,
            path_prefix: "/api/".to_string(),
        })
    }

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));

    #[test]
    fn test_allows_up_to_max() {
        let limiter = limiter(3);
        let now = Instant::now();
        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_at(CLIENT, now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
        assert!(!limiter.check_at(CLIENT, now).allowed);
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2);
        let start = Instant::now();
        assert!(limiter.check_at(CLIENT, start).allowed);
        assert!(limiter.check_at(CLIENT, start + Duration::from_secs(30)).allowed);
        assert!(!limiter.check_at(CLIENT, start + Duration::from_secs(59)).allowed);

        // First hit ages out; the one at +30s is still counted.
        let decision = limiter.check_at(CLIENT, start + Duration::from_secs(60));
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.reset_after, Duration::from_secs(30));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter(1);
        let now = Instant::now();
        let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check_at(CLIENT, now).allowed);
        assert!(!limiter.check_at(CLIENT, now).allowed);
        assert!(limiter.check_at(other, now).allowed);
    }

    #[test]
    fn test_sweep_removes_idle_clients() {
        let limiter = limiter(5);
        let start = Instant::now();
        limiter.check_at(CLIENT, start);
        limiter.check_at(IpAddr::V4(Ipv4Addr::LOCALHOST), start + Duration::from_secs(50));

        assert_eq!(limiter.sweep(start + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_prefix_matching() {
        let limiter = limiter(5);
        assert!(limiter.applies_to("/api/quote"));
        assert!(!limiter.applies_to("/health"));
        assert!(!limiter.applies_to("/"));
    }
}
