//! WebSocket render fan-out.
//!
//! `BroadcastRenderer` is the dashboard's `ChartRenderer`: each render call
//! becomes one JSON `render` frame on a broadcast channel that every
//! connected WebSocket client forwards.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use gex_chart::{Card, CardView, ChartRenderer, ChartStyle};

use crate::types::DashboardMessage;

/// Renderer that publishes frames to WebSocket clients.
#[derive(Debug, Clone)]
pub struct BroadcastRenderer {
    tx: broadcast::Sender<String>,
}

impl BroadcastRenderer {
    /// Create a renderer with a channel buffering `capacity` frames per client.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn sender(&self) -> broadcast::Sender<String> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl ChartRenderer for BroadcastRenderer {
    fn render(&self, card: Card, view: &CardView, style: &ChartStyle) {
        let msg = DashboardMessage::Render {
            timestamp_ms: Utc::now().timestamp_millis(),
            card,
            view,
            style,
        };

        match serde_json::to_string(&msg) {
            // No receivers is normal when no client is connected.
            Ok(json) => match self.tx.send(json) {
                Ok(n) => trace!(%card, receivers = n, "Render frame sent"),
                Err(_) => trace!(%card, "No WebSocket receivers connected"),
            },
            Err(e) => debug!(%card, error = %e, "Failed to serialize render frame"),
        }
    }
}
