//! Dashboard state management.
//!
//! `DashboardState` is the single explicit state object shared by the
//! scheduler, the filter/theme controls and the server. Everything that a
//! cycle may race with (filter, pause) is read once when the cycle starts.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::RwLock;

use gex_chart::{Card, CardView, ChartStyle, ERROR_LOADING_DATA};
use gex_core::{ChartSeries, FilterSelection, MarketSnapshot, ThemeMode};
use gex_feed::FetchError;
use gex_telemetry::Metrics;

use crate::types::{CardState, CardStatus, CyclePhase, DashboardSnapshot};

/// Fetches issued by one cycle (market and exposure).
const FETCHES_PER_CYCLE: usize = 2;

/// Process-wide dashboard state.
#[derive(Debug)]
pub struct DashboardState {
    filter: RwLock<FilterSelection>,
    theme: RwLock<ThemeMode>,
    paused: AtomicBool,
    in_flight: AtomicBool,
    phase: RwLock<CyclePhase>,
    pending_fetches: AtomicUsize,
    market: RwLock<CardState<MarketSnapshot>>,
    exposure: RwLock<CardState<ChartSeries>>,
    last_completed_ms: RwLock<Option<i64>>,
    cycles_completed: AtomicU64,
}

impl DashboardState {
    pub fn new(filter: FilterSelection, theme: ThemeMode) -> Self {
        Self {
            filter: RwLock::new(filter),
            theme: RwLock::new(theme),
            paused: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            phase: RwLock::new(CyclePhase::Idle),
            pending_fetches: AtomicUsize::new(0),
            market: RwLock::new(CardState::default()),
            exposure: RwLock::new(CardState::default()),
            last_completed_ms: RwLock::new(None),
            cycles_completed: AtomicU64::new(0),
        }
    }

    // ---------------------------------------------------------------------
    // User selections
    // ---------------------------------------------------------------------

    pub fn filter(&self) -> FilterSelection {
        *self.filter.read()
    }

    /// Modify the selection under one write lock and return the result.
    pub fn update_filter(&self, update: impl FnOnce(&mut FilterSelection)) -> FilterSelection {
        let mut filter = self.filter.write();
        update(&mut filter);
        *filter
    }

    pub fn theme(&self) -> ThemeMode {
        *self.theme.read()
    }

    pub fn set_theme(&self, theme: ThemeMode) {
        *self.theme.write() = theme;
    }

    /// Flip the theme and return the new mode.
    pub fn toggle_theme(&self) -> ThemeMode {
        let mut theme = self.theme.write();
        *theme = theme.toggled();
        *theme
    }

    /// Style for the current theme.
    pub fn style(&self) -> ChartStyle {
        ChartStyle::for_theme(self.theme())
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Set the pause gate. Returns the previous value.
    pub fn set_paused(&self, paused: bool) -> bool {
        self.paused.swap(paused, Ordering::AcqRel)
    }

    // ---------------------------------------------------------------------
    // Single-flight guard
    // ---------------------------------------------------------------------

    /// Claim the cycle slot. Returns `None` if a cycle is already running.
    ///
    /// The slot is released when the returned guard is dropped, including
    /// on early return or panic.
    pub fn try_begin_cycle(&self) -> Option<InFlightGuard<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        self.pending_fetches
            .store(FETCHES_PER_CYCLE, Ordering::Release);
        *self.phase.write() = CyclePhase::Fetching;
        Metrics::cycle_started();
        Some(InFlightGuard { state: self })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> CyclePhase {
        *self.phase.read()
    }

    /// Record that one of the cycle's fetches resolved. The phase stays
    /// `Fetching` until the last one does.
    pub(crate) fn fetch_resolved(&self) {
        let previous = self
            .pending_fetches
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            *self.phase.write() = CyclePhase::Rendering;
        }
    }

    // ---------------------------------------------------------------------
    // Card content
    // ---------------------------------------------------------------------

    /// Replace the market snapshot (no merge with the previous one).
    pub fn apply_market(&self, snapshot: MarketSnapshot) {
        let mut card = self.market.write();
        card.status = CardStatus::Ready;
        card.data = Some(snapshot);
        card.updated_ms = Some(Utc::now().timestamp_millis());
    }

    /// Mark the market card as failed. The last good snapshot is kept.
    pub fn fail_market(&self, error: &FetchError) {
        Self::fail_card(&mut self.market.write(), error);
    }

    /// Replace the exposure series.
    pub fn apply_exposure(&self, series: ChartSeries) {
        let mut card = self.exposure.write();
        card.status = CardStatus::Ready;
        card.data = Some(series);
        card.updated_ms = Some(Utc::now().timestamp_millis());
    }

    /// Mark the exposure card as failed. The last good series is kept.
    pub fn fail_exposure(&self, error: &FetchError) {
        Self::fail_card(&mut self.exposure.write(), error);
    }

    fn fail_card<T>(card: &mut CardState<T>, error: &FetchError) {
        card.status = CardStatus::Error {
            message: ERROR_LOADING_DATA.to_string(),
            kind: error.kind().as_str().to_string(),
        };
        card.updated_ms = Some(Utc::now().timestamp_millis());
    }

    pub fn market(&self) -> CardState<MarketSnapshot> {
        self.market.read().clone()
    }

    pub fn exposure(&self) -> CardState<ChartSeries> {
        self.exposure.read().clone()
    }

    /// What a card currently shows, or `None` before its first load.
    pub fn current_view(&self, card: Card) -> Option<CardView> {
        match card {
            Card::Market => {
                let state = self.market.read();
                Self::view_for(&state, |s| CardView::Market(s.clone()))
            }
            Card::Exposure => {
                let state = self.exposure.read();
                Self::view_for(&state, |s| CardView::Exposure(s.clone()))
            }
        }
    }

    fn view_for<T>(state: &CardState<T>, to_view: impl FnOnce(&T) -> CardView) -> Option<CardView> {
        match &state.status {
            CardStatus::Loading => None,
            CardStatus::Error { message, .. } => Some(CardView::Error {
                message: message.clone(),
            }),
            CardStatus::Ready => state.data.as_ref().map(to_view),
        }
    }

    pub(crate) fn record_completed_cycle(&self) {
        *self.last_completed_ms.write() = Some(Utc::now().timestamp_millis());
        self.cycles_completed.fetch_add(1, Ordering::AcqRel);
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Acquire)
    }

    /// Collect a full snapshot of the current state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let theme = self.theme();
        DashboardSnapshot {
            timestamp_ms: Utc::now().timestamp_millis(),
            filter: self.filter(),
            theme,
            style: ChartStyle::for_theme(theme),
            paused: self.is_paused(),
            in_flight: self.is_in_flight(),
            phase: self.phase(),
            market: self.market(),
            exposure: self.exposure(),
            last_completed_ms: *self.last_completed_ms.read(),
            cycles_completed: self.cycles_completed(),
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(FilterSelection::default(), ThemeMode::default())
    }
}

/// Holds the single-flight slot for the duration of a cycle.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    state: &'a DashboardState,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        *self.state.phase.write() = CyclePhase::Idle;
        self.state.pending_fetches.store(0, Ordering::Release);
        self.state.in_flight.store(false, Ordering::Release);
        Metrics::cycle_finished();
    }
}
