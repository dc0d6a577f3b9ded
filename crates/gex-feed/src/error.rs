//! Feed error types.

use std::fmt;
use thiserror::Error;

/// Construction-time errors for the API client.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Per-request failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never completed (connect failure, reset, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    ServerStatus { status: u16, body: String },

    /// The payload could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network(_) => FetchErrorKind::Network,
            Self::ServerStatus { .. } => FetchErrorKind::ServerStatus,
            Self::Decode(_) => FetchErrorKind::Decode,
        }
    }
}

/// Failure taxonomy, used for metrics labels and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Network,
    ServerStatus,
    Decode,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::ServerStatus => "server_status",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
