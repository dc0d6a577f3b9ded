//! Light/dark theme control.

use std::sync::Arc;

use tracing::{info, warn};

use gex_core::ThemeMode;
use gex_persistence::{PreferenceStore, THEME_KEY};
use gex_telemetry::Metrics;

use crate::scheduler::RefreshScheduler;

/// Owns the theme preference.
///
/// A toggle re-renders cached card content with the new style and never
/// touches the network.
#[derive(Clone)]
pub struct ThemeManager {
    scheduler: Arc<RefreshScheduler>,
    store: Arc<PreferenceStore>,
}

impl ThemeManager {
    pub fn new(scheduler: Arc<RefreshScheduler>, store: Arc<PreferenceStore>) -> Self {
        Self { scheduler, store }
    }

    /// Restore the persisted theme. Unknown values fall back to the default.
    pub fn load(&self) -> ThemeMode {
        let theme = match self.store.get(THEME_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring stored theme");
                ThemeMode::default()
            }),
            None => ThemeMode::default(),
        };
        self.scheduler.state().set_theme(theme);
        info!(%theme, "Theme loaded");
        theme
    }

    pub fn current(&self) -> ThemeMode {
        self.scheduler.state().theme()
    }

    /// Flip the theme, re-render from cache and persist it.
    ///
    /// A failed write is logged; the toggle stands.
    pub async fn toggle(&self) -> ThemeMode {
        let theme = self.scheduler.state().toggle_theme();
        Metrics::theme_toggled();

        let rendered = self.scheduler.rerender();
        info!(%theme, rendered, "Theme toggled");

        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || store.set(THEME_KEY, theme.as_str())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(%theme, error = %e, "Failed to persist theme"),
            Err(e) => warn!(%theme, error = %e, "Theme persist task failed"),
        }
        theme
    }
}
