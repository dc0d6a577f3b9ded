//! HTTP server implementation using axum.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

use gex_chart::ChartStyle;
use gex_core::ThemeMode;
use gex_persistence::{PreferenceStore, NOTES_KEY};
use gex_telemetry::Metrics;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::filter::FilterState;
use crate::scheduler::{CycleOutcome, RefreshScheduler, Trigger};
use crate::theme::ThemeManager;
use crate::types::{DashboardMessage, DashboardSnapshot};

/// Caps concurrent WebSocket connections.
#[derive(Debug)]
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Claim a slot. The guard owns the limiter so it can move into the
    /// upgraded connection task.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard {
                    limiter: Arc::clone(self),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    scheduler: Arc<RefreshScheduler>,
    filter: FilterState,
    theme: ThemeManager,
    store: Arc<PreferenceStore>,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        scheduler: Arc<RefreshScheduler>,
        store: Arc<PreferenceStore>,
        broadcast_tx: broadcast::Sender<String>,
        config: &DashboardConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            filter: FilterState::new(Arc::clone(&scheduler)),
            theme: ThemeManager::new(Arc::clone(&scheduler), Arc::clone(&store)),
            scheduler,
            store,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_connections)),
            shutdown,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FilterRequest {
    expiry: Option<String>,
    customer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PauseRequest {
    paused: bool,
}

#[derive(Debug, Serialize)]
struct PauseResponse {
    paused: bool,
}

#[derive(Debug, Serialize)]
struct ThemeResponse {
    theme: ThemeMode,
    style: ChartStyle,
}

#[derive(Debug, Serialize, Deserialize)]
struct NotesBody {
    notes: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Create the axum router.
pub fn create_router(state: AppState, config: &DashboardConfig) -> Router {
    let router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/state", get(get_state))
        .route("/api/filter", post(post_filter))
        .route("/api/refresh", post(post_refresh))
        .route("/api/pause", post(post_pause))
        .route("/api/theme/toggle", post(post_theme_toggle))
        .route("/api/notes", get(get_notes).put(put_notes))
        .route("/metrics", get(get_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state);

    match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

async fn get_state(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.scheduler.state().snapshot())
}

async fn post_filter(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> DashboardResult<Json<CycleOutcome>> {
    let outcome = state
        .filter
        .apply(req.expiry.as_deref(), req.customer.as_deref())
        .await?;
    Ok(Json(outcome))
}

async fn post_refresh(State(state): State<AppState>) -> Json<CycleOutcome> {
    Json(state.scheduler.run_cycle(Trigger::Manual).await)
}

async fn post_pause(
    State(state): State<AppState>,
    Json(req): Json<PauseRequest>,
) -> Json<PauseResponse> {
    state.scheduler.set_paused(req.paused);
    Json(PauseResponse {
        paused: state.scheduler.is_paused(),
    })
}

async fn post_theme_toggle(State(state): State<AppState>) -> Json<ThemeResponse> {
    let theme = state.theme.toggle().await;
    Json(ThemeResponse {
        theme,
        style: ChartStyle::for_theme(theme),
    })
}

async fn get_notes(State(state): State<AppState>) -> Json<NotesBody> {
    Json(NotesBody {
        notes: state.store.get(NOTES_KEY).unwrap_or_default(),
    })
}

async fn put_notes(
    State(state): State<AppState>,
    Json(body): Json<NotesBody>,
) -> DashboardResult<Json<NotesBody>> {
    let store = Arc::clone(&state.store);
    let notes = body.notes.clone();
    tokio::task::spawn_blocking(move || store.set(NOTES_KEY, notes)).await??;
    debug!(bytes = body.notes.len(), "Notes saved");
    Ok(Json(body))
}

async fn get_metrics() -> Response {
    match Metrics::gather_text() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let Some(guard) = state.connection_limiter.try_acquire() else {
        warn!(
            current = state.connection_limiter.current_count(),
            "WebSocket connection limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

/// Send a snapshot, then forward render frames until either side closes.
async fn handle_ws_connection(socket: WebSocket, state: AppState, _guard: ConnectionGuard) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot so no frame falls in between.
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    let snapshot = state.scheduler.state().snapshot();
    if let Ok(json) = serde_json::to_string(&DashboardMessage::Snapshot(&snapshot)) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("Failed to send initial snapshot, client disconnected");
            return;
        }
    }

    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send frame, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
            _ = state.shutdown.cancelled() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    }

    incoming_task.abort();
    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

/// Run the dashboard HTTP server until `shutdown` is cancelled.
pub async fn run_server(state: AppState, config: DashboardConfig) -> DashboardResult<()> {
    let shutdown = state.shutdown.clone();
    let app = create_router(state, &config);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Starting dashboard server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Dashboard server stopped");
    Ok(())
}
