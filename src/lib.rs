//! Swap aggregator gateway library.
//!
//! A thin HTTP front for a token-swap aggregator: validates quote and swap
//! requests, forwards them upstream under a timeout, and reshapes the
//! responses for browser clients.

pub mod aggregator;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod quoting;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
