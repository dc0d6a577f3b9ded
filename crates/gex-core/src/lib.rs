//! Core data model for the gamma exposure dashboard.
//!
//! This crate provides the value types shared by every stage of the
//! refresh pipeline:
//! - `ExposureRecord`, `MarketSnapshot`: payloads decoded from the market API
//! - `FilterSelection`: expiry/customer selection driving the exposure query
//! - `ChartSeries`: renderable call/put/net series keyed by strike
//! - `ThemeMode`: persisted light/dark preference

pub mod error;
pub mod filter;
pub mod theme;
pub mod types;

pub use error::{CoreError, Result};
pub use filter::{CustomerFilter, ExpiryFilter, FilterSelection};
pub use theme::ThemeMode;
pub use types::{ChartSeries, ExposureRecord, MarketSnapshot};
