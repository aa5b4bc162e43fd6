//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, pretty/compact/json)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (only when a metrics address is configured)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span via the trace layer
//! - Metrics calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
