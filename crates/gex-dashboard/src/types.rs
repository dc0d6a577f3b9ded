//! Dashboard API types.
//!
//! These types are used for JSON serialization in REST and WebSocket APIs.

use gex_chart::{Card, CardView, ChartStyle};
use gex_core::{ChartSeries, FilterSelection, MarketSnapshot, ThemeMode};
use serde::Serialize;

/// Phase of the current refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    Fetching,
    Rendering,
}

/// Display status of a card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardStatus {
    /// No cycle has completed for this card yet.
    #[default]
    Loading,
    Ready,
    Error {
        message: String,
        /// Failure kind (network/server_status/decode).
        kind: String,
    },
}

/// Last known content of a card.
///
/// `data` is kept across failed refreshes; `status` decides what is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardState<T> {
    pub status: CardStatus,
    pub data: Option<T>,
    /// When `status` last changed (Unix milliseconds).
    pub updated_ms: Option<i64>,
}

impl<T> Default for CardState<T> {
    fn default() -> Self {
        Self {
            status: CardStatus::Loading,
            data: None,
            updated_ms: None,
        }
    }
}

/// Full dashboard state snapshot (sent on WebSocket connect and via REST).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Timestamp when snapshot was taken (Unix milliseconds).
    pub timestamp_ms: i64,
    pub filter: FilterSelection,
    pub theme: ThemeMode,
    pub style: ChartStyle,
    pub paused: bool,
    pub in_flight: bool,
    pub phase: CyclePhase,
    pub market: CardState<MarketSnapshot>,
    pub exposure: CardState<ChartSeries>,
    /// Completion time of the most recent cycle.
    pub last_completed_ms: Option<i64>,
    pub cycles_completed: u64,
}

/// WebSocket message types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMessage<'a> {
    /// Full snapshot (sent on connect).
    Snapshot(&'a DashboardSnapshot),
    /// One card to draw.
    Render {
        timestamp_ms: i64,
        card: Card,
        view: &'a CardView,
        style: &'a ChartStyle,
    },
}
