//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger_on_signal → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     first trigger only → HTTP server stops accepting, drains in-flight requests
//!               → rate-limiter sweeper exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
