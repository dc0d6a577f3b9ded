//! Chart rendering boundary.
//!
//! The pipeline hands finished views to a `ChartRenderer` and never depends
//! on a concrete charting library.

use crate::style::ChartStyle;
use gex_core::{ChartSeries, MarketSnapshot};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Message shown on a card whose fetch failed.
pub const ERROR_LOADING_DATA: &str = "Error loading data";

/// Dashboard card. Error state is scoped to a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Card {
    /// Spot price / change display.
    Market,
    /// Gamma exposure by strike chart.
    Exposure,
}

impl Card {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Exposure => "exposure",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a card should display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CardView {
    Market(MarketSnapshot),
    Exposure(ChartSeries),
    Error { message: String },
}

impl CardView {
    /// Generic load failure view.
    pub fn load_error() -> Self {
        Self::Error {
            message: ERROR_LOADING_DATA.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Rendering capability.
///
/// Called from the refresh pipeline and on theme changes. Implementations
/// must not block: hand the view off and return.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, card: Card, view: &CardView, style: &ChartStyle);
}

/// Renderer that only logs what would be drawn. Used for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn render(&self, card: Card, view: &CardView, style: &ChartStyle) {
        match view {
            CardView::Market(snapshot) => info!(
                %card,
                theme = %style.theme,
                spot_price = snapshot.spot_price,
                price_change = snapshot.price_change,
                price_change_pct = snapshot.price_change_pct,
                timestamp = %snapshot.timestamp,
                "Render market card"
            ),
            CardView::Exposure(series) => info!(
                %card,
                theme = %style.theme,
                title = %series.title,
                points = series.len(),
                is_sample = series.is_sample,
                "Render exposure chart"
            ),
            CardView::Error { message } => info!(%card, %message, "Render error state"),
        }
    }
}
