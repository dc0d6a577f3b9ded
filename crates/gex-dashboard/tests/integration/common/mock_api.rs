//! Mock market API server for integration tests.
//!
//! Serves both polled endpoints and can:
//! - Count requests per endpoint
//! - Record the last exposure query string
//! - Inject latency or a 500 response per endpoint

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Default)]
struct MockState {
    market_hits: AtomicUsize,
    exposure_hits: AtomicUsize,
    market_delay_ms: AtomicU64,
    exposure_delay_ms: AtomicU64,
    fail_market: AtomicBool,
    fail_exposure: AtomicBool,
    exposure_records: Mutex<Vec<Value>>,
    last_query: Mutex<Option<String>>,
}

/// A mock market API for testing.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockApi {
    /// Start the mock on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState::default());
        *state.exposure_records.lock() = default_records();

        let app = Router::new()
            .route("/api/market-metrics/", get(market_metrics))
            .route("/api/gamma-exposure/", get(gamma_exposure))
            .with_state(Arc::clone(&state));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL to hand to `Fetcher::new`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn market_hits(&self) -> usize {
        self.state.market_hits.load(Ordering::SeqCst)
    }

    pub fn exposure_hits(&self) -> usize {
        self.state.exposure_hits.load(Ordering::SeqCst)
    }

    pub fn total_hits(&self) -> usize {
        self.market_hits() + self.exposure_hits()
    }

    /// Query string of the most recent exposure request.
    pub fn last_exposure_query(&self) -> Option<String> {
        self.state.last_query.lock().clone()
    }

    /// Delay every response by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.set_market_delay(delay);
        self.set_exposure_delay(delay);
    }

    pub fn set_market_delay(&self, delay: Duration) {
        self.state
            .market_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_exposure_delay(&self, delay: Duration) {
        self.state
            .exposure_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_market(&self, fail: bool) {
        self.state.fail_market.store(fail, Ordering::SeqCst);
    }

    pub fn fail_exposure(&self, fail: bool) {
        self.state.fail_exposure.store(fail, Ordering::SeqCst);
    }

    /// Replace the exposure response body.
    pub fn set_exposure_records(&self, records: Vec<Value>) {
        *self.state.exposure_records.lock() = records;
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn default_records() -> Vec<Value> {
    vec![
        json!({"strike_price": 5000.0, "call_gamma_exposure": 5.0, "put_gamma_exposure": 3.0, "total_gamma_exposure": 2.0}),
        json!({"strike_price": 4980.0, "call_gamma_exposure": 1.0, "put_gamma_exposure": 9.0, "total_gamma_exposure": -8.0}),
        json!({"strike_price": 5020.0, "call_gamma_exposure": null, "put_gamma_exposure": -4.0, "total_gamma_exposure": null}),
    ]
}

async fn delay(delay_ms: &AtomicU64) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

async fn market_metrics(State(state): State<Arc<MockState>>) -> Response {
    state.market_hits.fetch_add(1, Ordering::SeqCst);
    delay(&state.market_delay_ms).await;

    if state.fail_market.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(json!({
        "spot_price": 5012.5,
        "price_change": 12.5,
        "price_change_pct": 0.25,
        "timestamp": "2024-05-01T15:00:00Z",
        "symbol": "SPX",
        "prev_day_close": 5000.0
    }))
    .into_response()
}

async fn gamma_exposure(
    State(state): State<Arc<MockState>>,
    RawQuery(query): RawQuery,
) -> Response {
    state.exposure_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock() = query;
    delay(&state.exposure_delay_ms).await;

    if state.fail_exposure.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let records = state.exposure_records.lock().clone();
    Json(Value::Array(records)).into_response()
}
