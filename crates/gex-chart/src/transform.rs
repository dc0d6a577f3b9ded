//! Exposure series transformation.
//!
//! Turns one poll's exposure records into three aligned series (call bars,
//! put bars, net line). Pure and deterministic: the same records and label
//! always produce the same series.

use gex_core::{ChartSeries, ExposureRecord};

/// Approximate number of bars kept after downsampling.
pub const TARGET_BAR_COUNT: usize = 20;

/// Strike spacing and center of the placeholder series.
const SAMPLE_CENTER_STRIKE: f64 = 5000.0;
const SAMPLE_STRIKE_STEP: f64 = 20.0;
const SAMPLE_HALF_WIDTH: i32 = 5;

/// Chart title for an expiry label.
pub fn series_title(expiry_label: &str) -> String {
    format!("Gamma Exposure by Strike ({expiry_label})")
}

/// Build a chart series from exposure records.
///
/// Records are stably sorted by strike, then decimated by index with
/// `step = max(1, len / TARGET_BAR_COUNT)`; dropped records are not
/// aggregated into the kept ones. Missing components count as zero and put
/// exposure is always drawn below the axis.
///
/// Empty input yields the placeholder from [`sample_series`].
pub fn build_series(records: &[ExposureRecord], expiry_label: &str) -> ChartSeries {
    if records.is_empty() {
        return sample_series(expiry_label);
    }

    let mut sorted: Vec<&ExposureRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.strike_price.total_cmp(&b.strike_price));

    let step = (sorted.len() / TARGET_BAR_COUNT).max(1);
    let capacity = sorted.len().div_ceil(step);

    let mut series = ChartSeries {
        strikes: Vec::with_capacity(capacity),
        calls: Vec::with_capacity(capacity),
        puts: Vec::with_capacity(capacity),
        net: Vec::with_capacity(capacity),
        title: series_title(expiry_label),
        is_sample: false,
    };

    for record in sorted.into_iter().step_by(step) {
        series.strikes.push(record.strike_price);
        series.calls.push(record.call_gamma_exposure.unwrap_or(0.0));
        series.puts.push(-record.put_gamma_exposure.unwrap_or(0.0).abs());
        series.net.push(record.total_gamma_exposure.unwrap_or(0.0));
    }

    series
}

/// Placeholder series shown when the backend returned no records.
///
/// Values are synthetic and flagged with `is_sample` so the renderer can
/// tell "no data" apart from "zero exposure".
pub fn sample_series(expiry_label: &str) -> ChartSeries {
    let mut series = ChartSeries {
        strikes: Vec::new(),
        calls: Vec::new(),
        puts: Vec::new(),
        net: Vec::new(),
        title: series_title(expiry_label),
        is_sample: true,
    };

    for offset in -SAMPLE_HALF_WIDTH..=SAMPLE_HALF_WIDTH {
        let d = f64::from(offset);
        let envelope = (-(d / 3.0).powi(2)).exp();
        let call = 500.0 * envelope * (1.0 + 0.1 * d);
        let put = -450.0 * envelope * (1.0 - 0.1 * d);

        series
            .strikes
            .push(SAMPLE_CENTER_STRIKE + d * SAMPLE_STRIKE_STEP);
        series.calls.push(call);
        series.puts.push(put);
        series.net.push(call + put);
    }

    series
}
