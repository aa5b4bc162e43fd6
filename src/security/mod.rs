//! Security subsystem (ingress filter).
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (reject disallowed Origin with 403, answer preflights)
//!     → body limit (tower-http RequestBodyLimitLayer, wired in http::server)
//!     → rate_limit.rs (sliding window per client IP under /api/)
//!     → handler
//! Outgoing response:
//!     → headers.rs (security headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Rejections short-circuit before validation or upstream calls
//! - No application data is mutated here

pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use cors::{cors_layer, origin_guard, OriginPolicy};
pub use headers::apply_security_headers;
pub use rate_limit::{rate_limit_middleware, RateDecision, RateLimiter};
