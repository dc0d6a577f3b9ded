//! Prometheus metrics for the refresh pipeline.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on duplicate
//! metric names, which is a programming error caught at first use.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, register_int_gauge,
    register_int_gauge_vec, CounterVec, Encoder, HistogramVec, IntCounter, IntGauge, IntGaugeVec,
    TextEncoder,
};

/// Refresh cycles by outcome.
/// Labels: outcome (completed/partial/failed/skipped_paused/skipped_in_flight)
pub static CYCLES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gex_cycles_total",
        "Refresh cycles by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Refresh cycle currently running (1) or idle (0).
pub static CYCLE_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "gex_cycle_in_flight",
        "Whether a refresh cycle is currently running"
    )
    .unwrap()
});

/// Fetch latency in milliseconds.
pub static FETCH_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "gex_fetch_latency_ms",
        "Market API request latency in milliseconds",
        &["endpoint"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Fetch failures by endpoint and kind.
/// Labels: endpoint (market_metrics/gamma_exposure), kind (network/server_status/decode)
pub static FETCH_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "gex_fetch_errors_total",
        "Market API request failures",
        &["endpoint", "kind"]
    )
    .unwrap()
});

/// Points in the most recently rendered exposure series.
/// Labels: sample (true/false)
pub static SERIES_POINTS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "gex_series_points",
        "Strike count of the last rendered exposure series",
        &["sample"]
    )
    .unwrap()
});

/// Theme toggles.
pub static THEME_TOGGLES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("gex_theme_toggles_total", "Theme toggles").unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a finished or skipped cycle.
    pub fn cycle(outcome: &str) {
        CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    }

    pub fn cycle_started() {
        CYCLE_IN_FLIGHT.set(1);
    }

    pub fn cycle_finished() {
        CYCLE_IN_FLIGHT.set(0);
    }

    pub fn fetch_latency(endpoint: &str, latency_ms: f64) {
        FETCH_LATENCY_MS
            .with_label_values(&[endpoint])
            .observe(latency_ms);
    }

    pub fn fetch_error(endpoint: &str, kind: &str) {
        FETCH_ERRORS_TOTAL.with_label_values(&[endpoint, kind]).inc();
    }

    /// Record the size of a rendered series. Only one of the two label
    /// values is non-zero at a time.
    pub fn series_points(points: usize, is_sample: bool) {
        let (active, idle) = if is_sample {
            ("true", "false")
        } else {
            ("false", "true")
        };
        SERIES_POINTS
            .with_label_values(&[active])
            .set(points as i64);
        SERIES_POINTS.with_label_values(&[idle]).set(0);
    }

    pub fn theme_toggled() {
        THEME_TOGGLES_TOTAL.inc();
    }

    /// Render the default registry in Prometheus text format.
    pub fn gather_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
