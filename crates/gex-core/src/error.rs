//! Error types for gex-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid expiry filter: {0}")]
    InvalidExpiry(String),

    #[error("Invalid customer filter: {0}")]
    InvalidCustomer(String),

    #[error("Invalid theme mode: {0}")]
    InvalidTheme(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
