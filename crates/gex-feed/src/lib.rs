//! Market data API client for the gamma exposure dashboard.
//!
//! Issues the two polling requests (market metrics and gamma exposure by
//! strike) and normalizes every failure into a `FetchError` with one of
//! three kinds: network, server status, or decode. Retry policy belongs to
//! the caller.

pub mod client;
pub mod error;

pub use client::{Endpoint, Fetcher, DEFAULT_TIMEOUT};
pub use error::{FeedError, FeedResult, FetchError, FetchErrorKind, FetchResult};
