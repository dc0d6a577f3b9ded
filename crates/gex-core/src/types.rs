//! Market data payloads and derived chart series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Gamma exposure aggregated at one strike.
///
/// Exposure components are `null` on the wire when the backend has no
/// contracts for that side of the strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureRecord {
    pub strike_price: f64,
    #[serde(default)]
    pub call_gamma_exposure: Option<f64>,
    #[serde(default)]
    pub put_gamma_exposure: Option<f64>,
    #[serde(default)]
    pub total_gamma_exposure: Option<f64>,
}

impl ExposureRecord {
    pub fn new(strike_price: f64, call: f64, put: f64, total: f64) -> Self {
        Self {
            strike_price,
            call_gamma_exposure: Some(call),
            put_gamma_exposure: Some(put),
            total_gamma_exposure: Some(total),
        }
    }
}

/// Latest spot price summary.
///
/// Each poll replaces the previous snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub spot_price: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price_change: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price_change_pct: f64,
    pub timestamp: DateTime<Utc>,
    /// Underlying symbol (e.g. "_SPX").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_day_close: Option<f64>,
    /// Backend status note, set when no metrics rows exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl MarketSnapshot {
    /// True when the backend reported a placeholder instead of real metrics.
    pub fn has_data(&self) -> bool {
        self.status.is_none()
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Chart-ready exposure series.
///
/// `strikes`, `calls`, `puts` and `net` are parallel: index `i` of each
/// refers to the same strike. Puts are always non-positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub strikes: Vec<f64>,
    pub calls: Vec<f64>,
    pub puts: Vec<f64>,
    pub net: Vec<f64>,
    pub title: String,
    /// Placeholder data rendered when the backend returned no records.
    pub is_sample: bool,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }
}
