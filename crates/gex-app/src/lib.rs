//! Gamma exposure dashboard client.
//!
//! Wires the market API client, the refresh pipeline and the dashboard
//! server into one process:
//! - Configuration loading (TOML)
//! - Refresh timer plus HTTP/WebSocket dashboard
//! - Single-shot mode for scripted runs

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
