//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Baseline verbosity when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    fn default_directive(self) -> &'static str {
        match self {
            Self::Info => "info,gex=debug",
            Self::Debug => "debug,hyper=info,reqwest=info",
        }
    }
}

/// Initialize structured logging.
///
/// `RUST_LOG` takes precedence over `level`. Output is JSON when
/// `RUST_ENV=production`, pretty otherwise.
pub fn init_logging(level: LogLevel) -> TelemetryResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.default_directive()));

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
    }
}
