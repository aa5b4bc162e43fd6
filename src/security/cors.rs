//! Cross-origin policy.
//!
//! Two pieces work together:
//! - [`origin_guard`] rejects any request whose `Origin` is present but not
//!   allowed, before handler logic runs (403).
//! - [`cors_layer`] answers preflights and adds CORS headers for allowed origins.

use axum::{
    body::Body,
    extract::State,
    http::{header, request, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::http::response::ApiError;

/// Configured allow-list of browser origins.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Arc<HashSet<String>>,
}

impl OriginPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = origins
            .into_iter()
            .map(|o| normalize(o.as_ref()))
            .filter(|o| !o.is_empty())
            .collect();
        Self {
            allowed: Arc::new(allowed),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.contains(&normalize(origin))
    }

    /// A request passes when it carries no `Origin` header or an allowed one.
    pub fn permits(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(value) => value.to_str().map(|o| self.is_allowed(o)).unwrap_or(false),
        }
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

pub async fn origin_guard(
    State(policy): State<OriginPolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN);
    if policy.permits(origin) {
        return next.run(request).await;
    }

    tracing::warn!(
        origin = ?origin,
        path = %request.uri().path(),
        "Rejected request from disallowed origin"
    );
    ApiError::OriginRejected.into_response()
}

/// CORS response headers for allowed origins.
pub fn cors_layer(policy: &OriginPolicy) -> CorsLayer {
    let policy = policy.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &request::Parts| {
            origin.to_str().map(|o| policy.is_allowed(o)).unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
