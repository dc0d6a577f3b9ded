//! gex-dashboard - Refresh pipeline and live surface for the gamma exposure dashboard.
//!
//! This crate owns everything between the market API client and the chart
//! renderer:
//!
//! - `RefreshScheduler`: timer and single-flight refresh cycles
//! - `FilterState` / `ThemeManager`: user controls feeding the pipeline
//! - `BroadcastRenderer`: render frames fanned out to WebSocket clients
//! - axum server exposing state, controls, notes and metrics
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  triggers: timer │ POST /api/filter │ POST /api/refresh      │
//! │                  ▼                                           │
//! │  RefreshScheduler::run_cycle  (paused? in flight? → skip)    │
//! │        │ tokio::join!                                        │
//! │   ┌────┴──────────────┐                                      │
//! │   ▼                   ▼                                      │
//! │  market snapshot     exposure → build_series                 │
//! │   │                   │                                      │
//! │   └──── DashboardState (cards, filter, theme) ───┐           │
//! │                                                  ▼           │
//! │        ChartRenderer::render(card, view, style)              │
//! │                  │ BroadcastRenderer                         │
//! │                  ▼                                           │
//! │        GET /ws  → snapshot, then render frames               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A theme toggle re-renders from `DashboardState` without a cycle.
//!
//! # Usage
//!
//! ```ignore
//! use gex_dashboard::{
//!     AppState, BroadcastRenderer, DashboardConfig, DashboardState, RefreshScheduler, run_server,
//! };
//!
//! let renderer = BroadcastRenderer::new(config.broadcast_capacity);
//! let scheduler = Arc::new(RefreshScheduler::new(
//!     Arc::new(DashboardState::default()),
//!     fetcher,
//!     Arc::new(renderer.clone()),
//!     Duration::from_secs(60),
//! ));
//! scheduler.start(shutdown.clone());
//!
//! let app = AppState::new(scheduler, store, renderer.sender(), &config, shutdown);
//! run_server(app, config).await?;
//! ```

mod broadcast;
mod config;
mod error;
mod filter;
mod scheduler;
mod server;
mod state;
mod theme;
mod types;

pub use broadcast::BroadcastRenderer;
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use filter::FilterState;
pub use scheduler::{
    CycleOutcome, CycleReport, RefreshScheduler, SkipReason, Trigger, DEFAULT_REFRESH_INTERVAL,
};
pub use server::{create_router, run_server, AppState, ConnectionGuard, ConnectionLimiter};
pub use state::{DashboardState, InFlightGuard};
pub use theme::ThemeManager;
pub use types::{CardState, CardStatus, CyclePhase, DashboardMessage, DashboardSnapshot};
