//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up the ingress filter (origin guard, CORS, body limit, rate limit)
//! - Wire up cross-cutting layers (request ID, tracing, panics, compression,
//!   security headers, metrics)
//! - Serve with graceful shutdown

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::aggregator::AggregatorClient;
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::security::{
    apply_security_headers, cors_layer, origin_guard, rate_limit_middleware, OriginPolicy,
    RateLimiter,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub aggregator: AggregatorClient,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let config = Arc::new(config);
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        let state = AppState {
            config: config.clone(),
            aggregator: AggregatorClient::new(&config.upstream),
        };

        let router = Self::build_router(&config, state, limiter.clone());
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers added later wrap earlier ones, so the request ID is assigned
    /// first and the rate limiter runs last before the handler.
    fn build_router(config: &GatewayConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        let policy = OriginPolicy::new(&config.security.allowed_origins);

        let router = Router::new()
            .route("/", get(handlers::banner))
            .route("/health", get(handlers::health))
            .route("/api/tokens", get(handlers::list_tokens))
            .route("/api/quote", post(handlers::create_quote))
            .route("/api/swap", post(handlers::create_swap))
            .fallback(handlers::not_found)
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .with_state(state)
            .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_bytes))
            .layer(cors_layer(&policy))
            .layer(middleware::from_fn_with_state(policy, origin_guard))
            .layer(middleware::from_fn(track_metrics));

        let router = if config.security.enable_headers {
            apply_security_headers(router)
        } else {
            router
        };

        router
            .layer(CompressionLayer::new())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.request_id(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.server.service_name,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        if spawn_rate_limit_sweeper(self.limiter.clone(), shutdown.resubscribe()).is_none() {
            tracing::debug!("Rate limiting disabled; idle-client sweeper not started");
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Periodically drop rate-limit windows for idle clients.
///
/// Nothing is spawned when the limiter is disabled or has no window.
fn spawn_rate_limit_sweeper(
    limiter: Arc<RateLimiter>,
    mut shutdown: broadcast::Receiver<()>,
) -> Option<JoinHandle<()>> {
    if !limiter.is_enabled() || limiter.window().is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let removed = limiter.sweep(std::time::Instant::now());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = limiter.tracked_clients(), "Swept idle rate-limit windows");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    }))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&method, &route, response.status().as_u16(), start);
    response
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_sweeper_skipped_when_rate_limit_disabled() {
        let (tx, _) = broadcast::channel(1);

        let mut config = crate::config::RateLimitConfig::default();
        config.enabled = false;
        config.window_secs = 0;
        let disabled = Arc::new(RateLimiter::new(&config));
        assert!(spawn_rate_limit_sweeper(disabled, tx.subscribe()).is_none());

        let enabled = Arc::new(RateLimiter::new(&crate::config::RateLimitConfig::default()));
        let handle = spawn_rate_limit_sweeper(enabled, tx.subscribe()).unwrap();
        tx.send(()).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_panic_maps_to_generic_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
