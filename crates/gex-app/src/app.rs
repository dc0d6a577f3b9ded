//! Application wiring and lifecycle.

use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use gex_chart::{ChartRenderer, LogRenderer};
use gex_core::ThemeMode;
use gex_dashboard::{
    run_server, AppState, BroadcastRenderer, CycleReport, DashboardResult, DashboardState,
    RefreshScheduler, ThemeManager, Trigger,
};
use gex_feed::Fetcher;
use gex_persistence::PreferenceStore;

use crate::config::AppConfig;
use crate::error::AppResult;

/// Main application.
pub struct Application {
    config: AppConfig,
    scheduler: Arc<RefreshScheduler>,
    renderer: BroadcastRenderer,
    store: Arc<PreferenceStore>,
    shutdown: CancellationToken,
}

impl Application {
    /// Create the application: API client, preference store and pipeline.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let renderer = BroadcastRenderer::new(config.dashboard.broadcast_capacity);
        let (scheduler, store) = build_pipeline(&config, Arc::new(renderer.clone()))?;

        Ok(Self {
            config,
            scheduler,
            renderer,
            store,
            shutdown: CancellationToken::new(),
        })
    }

    /// Run until Ctrl-C or until the dashboard server fails.
    pub async fn run(self) -> AppResult<()> {
        info!(
            api_base_url = %self.config.api_base_url,
            interval_secs = self.config.refresh_interval_secs,
            "Starting application"
        );

        let timer = self.scheduler.start(self.shutdown.clone());

        let mut server = if self.config.dashboard.enabled {
            let state = AppState::new(
                Arc::clone(&self.scheduler),
                Arc::clone(&self.store),
                self.renderer.sender(),
                &self.config.dashboard,
                self.shutdown.clone(),
            );
            let config = self.config.dashboard.clone();
            Some(tokio::spawn(run_server(state, config)))
        } else {
            info!("Dashboard server disabled");
            None
        };

        let finished = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                None
            }
            joined = wait_for_server(&mut server) => Some(joined),
        };

        let mut result: AppResult<()> = Ok(());
        if let Some(joined) = finished {
            server = None;
            match joined {
                Ok(Ok(())) => warn!("Dashboard server exited"),
                Ok(Err(e)) => {
                    error!(error = %e, "Dashboard server failed");
                    result = Err(e.into());
                }
                Err(e) => error!(error = %e, "Dashboard server task panicked"),
            }
        }

        self.shutdown.cancel();
        if let Err(e) = timer.await {
            warn!(error = %e, "Refresh timer task failed");
        }
        if let Some(handle) = server {
            match handle.await {
                Ok(Err(e)) => warn!(error = %e, "Dashboard server stopped with error"),
                Err(e) => warn!(error = %e, "Dashboard server task failed"),
                Ok(Ok(())) => {}
            }
        }

        info!(
            cycles = self.scheduler.state().cycles_completed(),
            "Shutting down"
        );
        result
    }

    /// Run a single cycle with a logging renderer and return its report.
    pub async fn run_once(config: &AppConfig) -> AppResult<Option<CycleReport>> {
        let (scheduler, _) = build_pipeline(config, Arc::new(LogRenderer))?;
        let outcome = scheduler.run_cycle(Trigger::Manual).await;
        Ok(outcome.report().cloned())
    }
}

/// Resolves when the server task ends; never resolves when there is none.
async fn wait_for_server(
    server: &mut Option<JoinHandle<DashboardResult<()>>>,
) -> Result<DashboardResult<()>, JoinError> {
    match server.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn build_pipeline(
    config: &AppConfig,
    renderer: Arc<dyn ChartRenderer>,
) -> AppResult<(Arc<RefreshScheduler>, Arc<PreferenceStore>)> {
    let fetcher = Fetcher::new(&config.api_base_url, config.request_timeout())?;
    let store = Arc::new(PreferenceStore::open(&config.preferences.path)?);
    let state = Arc::new(DashboardState::new(config.filter, ThemeMode::default()));

    let scheduler = Arc::new(RefreshScheduler::new(
        state,
        fetcher,
        renderer,
        config.refresh_interval(),
    ));
    ThemeManager::new(Arc::clone(&scheduler), Arc::clone(&store)).load();

    Ok((scheduler, store))
}
