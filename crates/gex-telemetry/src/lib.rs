//! Prometheus metrics and structured logging for the gamma exposure dashboard.
//!
//! - Prometheus metrics for refresh cycles, fetch latency and failures
//! - Structured logging with tracing (JSON in production)
//! - Text exposition for a `/metrics` endpoint

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogLevel};
pub use metrics::Metrics;
