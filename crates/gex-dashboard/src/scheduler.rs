//! Refresh pipeline.
//!
//! A cycle fetches the market snapshot and the exposure series concurrently,
//! stores each result in `DashboardState` and renders each card as soon as
//! its own fetch resolves. Timer ticks, filter changes and manual refreshes
//! all enter through `run_cycle` and share one single-flight slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gex_chart::{build_series, Card, ChartRenderer};
use gex_core::FilterSelection;
use gex_feed::Fetcher;
use gex_telemetry::Metrics;

use crate::state::DashboardState;

/// Default refresh period.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// What asked for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Startup,
    Timer,
    FilterChange,
    Manual,
}

/// Why a cycle did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Paused,
    InFlight,
}

/// Result of a completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub trigger: Trigger,
    /// Selection the exposure request was issued with.
    pub filter: FilterSelection,
    pub market_ok: bool,
    pub exposure_ok: bool,
    pub duration_ms: u64,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.market_ok && self.exposure_ok
    }

    /// Metric label: `completed`, `partial` or `failed`.
    pub fn outcome_label(&self) -> &'static str {
        match (self.market_ok, self.exposure_ok) {
            (true, true) => "completed",
            (false, false) => "failed",
            _ => "partial",
        }
    }
}

/// Outcome of `RefreshScheduler::run_cycle`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleOutcome {
    Skipped { reason: SkipReason },
    Completed(CycleReport),
}

impl CycleOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped { .. } => None,
        }
    }
}

/// Drives refresh cycles.
pub struct RefreshScheduler {
    state: Arc<DashboardState>,
    fetcher: Fetcher,
    renderer: Arc<dyn ChartRenderer>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(
        state: Arc<DashboardState>,
        fetcher: Fetcher,
        renderer: Arc<dyn ChartRenderer>,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            fetcher,
            renderer,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_paused(&self, paused: bool) {
        let was = self.state.set_paused(paused);
        if was != paused {
            info!(paused, "Auto-refresh pause toggled");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Start the recurring timer.
    ///
    /// The first tick fires immediately. Each tick spawns its own cycle so a
    /// slow cycle never delays the timer; overlapping ticks are skipped by
    /// the single-flight guard. The loop exits when `shutdown` is cancelled.
    pub fn start(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut first = true;

            info!(interval_ms = scheduler.interval.as_millis() as u64, "Refresh timer started");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Refresh timer stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let trigger = if first { Trigger::Startup } else { Trigger::Timer };
                        first = false;
                        let scheduler = Arc::clone(&scheduler);
                        tokio::spawn(async move {
                            scheduler.run_cycle(trigger).await;
                        });
                    }
                }
            }
        })
    }

    /// Run one cycle unless paused or another cycle is in flight.
    ///
    /// Never fails: per-endpoint errors are recorded on the affected card.
    pub async fn run_cycle(&self, trigger: Trigger) -> CycleOutcome {
        if self.state.is_paused() {
            debug!(?trigger, "Cycle skipped: paused");
            Metrics::cycle("skipped_paused");
            return CycleOutcome::Skipped {
                reason: SkipReason::Paused,
            };
        }

        let Some(_guard) = self.state.try_begin_cycle() else {
            debug!(?trigger, "Cycle skipped: already in flight");
            Metrics::cycle("skipped_in_flight");
            return CycleOutcome::Skipped {
                reason: SkipReason::InFlight,
            };
        };

        let filter = self.state.filter();
        let started = Instant::now();
        debug!(?trigger, expiry = %filter.expiry, customer = %filter.customer, "Cycle started");

        let (market_ok, exposure_ok) =
            tokio::join!(self.refresh_market(), self.refresh_exposure(filter));

        self.state.record_completed_cycle();
        let report = CycleReport {
            trigger,
            filter,
            market_ok,
            exposure_ok,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        Metrics::cycle(report.outcome_label());

        if report.is_success() {
            info!(?trigger, duration_ms = report.duration_ms, "Cycle completed");
        } else {
            warn!(
                ?trigger,
                market_ok,
                exposure_ok,
                duration_ms = report.duration_ms,
                "Cycle completed with errors"
            );
        }

        CycleOutcome::Completed(report)
    }

    async fn refresh_market(&self) -> bool {
        let ok = match self.fetcher.fetch_market_snapshot().await {
            Ok(snapshot) => {
                if !snapshot.has_data() {
                    debug!(status = ?snapshot.status, "Market snapshot has no data");
                }
                self.state.apply_market(snapshot);
                true
            }
            Err(e) => {
                self.state.fail_market(&e);
                false
            }
        };
        self.state.fetch_resolved();
        self.render_card(Card::Market);
        ok
    }

    async fn refresh_exposure(&self, filter: FilterSelection) -> bool {
        let ok = match self.fetcher.fetch_exposure(&filter).await {
            Ok(records) => {
                let series = build_series(&records, filter.expiry.label());
                Metrics::series_points(series.len(), series.is_sample);
                debug!(
                    records = records.len(),
                    points = series.len(),
                    is_sample = series.is_sample,
                    "Exposure series built"
                );
                self.state.apply_exposure(series);
                true
            }
            Err(e) => {
                self.state.fail_exposure(&e);
                false
            }
        };
        self.state.fetch_resolved();
        self.render_card(Card::Exposure);
        ok
    }

    /// Render one card from cached state with the current theme.
    fn render_card(&self, card: Card) -> bool {
        let Some(view) = self.state.current_view(card) else {
            return false;
        };
        let style = self.state.style();
        self.renderer.render(card, &view, &style);
        true
    }

    /// Re-render every loaded card from cache. No network access.
    ///
    /// Returns the number of cards rendered.
    pub fn rerender(&self) -> usize {
        [Card::Market, Card::Exposure]
            .into_iter()
            .filter(|card| self.render_card(*card))
            .count()
    }
}
