//! Upstream aggregator subsystem.
//!
//! # Data Flow
//! ```text
//! validated request (quoting::types)
//!     → client.rs (build URL, outbound call under timeout, status mapping)
//!     → shaper.rs (project only the fields the caller needs)
//!     → http handlers
//! ```
//!
//! # Design Decisions
//! - Single outbound attempt per request; failures surface immediately
//! - Response bodies are parsed as JSON whatever the status code
//! - Upstream payloads are opaque except for the few fields we project

pub mod client;
pub mod shaper;
pub mod types;

pub use client::AggregatorClient;
pub use types::{CallOutcome, UpstreamError, UpstreamResult};
