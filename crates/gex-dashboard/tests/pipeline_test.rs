//! Refresh pipeline integration tests.
//!
//! Runs real cycles against the mock market API:
//! - Single-flight and pause gating
//! - Per-card error isolation and stale data
//! - Filter changes, theme toggles and the refresh timer

mod integration;
use integration::common::mock_api::MockApi;
use integration::common::recording::RecordingRenderer;

use std::sync::Arc;
use std::time::Duration;

use gex_chart::{Card, CardView, ERROR_LOADING_DATA};
use gex_core::{CustomerFilter, ExpiryFilter, ThemeMode};
use gex_dashboard::{
    CardStatus, CycleOutcome, CyclePhase, DashboardState, FilterState, RefreshScheduler, SkipReason,
    ThemeManager, Trigger,
};
use gex_feed::Fetcher;
use gex_persistence::{PreferenceStore, THEME_KEY};
use tokio_util::sync::CancellationToken;

fn scheduler_for(api: &MockApi, interval: Duration) -> (Arc<RefreshScheduler>, Arc<RecordingRenderer>) {
    let renderer = Arc::new(RecordingRenderer::default());
    let fetcher = Fetcher::new(&api.base_url(), Duration::from_secs(5)).unwrap();
    let scheduler = Arc::new(RefreshScheduler::new(
        Arc::new(DashboardState::default()),
        fetcher,
        renderer.clone(),
        interval,
    ));
    (scheduler, renderer)
}

#[tokio::test]
async fn test_cycle_renders_both_cards() {
    let api = MockApi::start().await;
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));

    let outcome = scheduler.run_cycle(Trigger::Manual).await;
    let report = outcome.report().expect("cycle should run");
    assert!(report.is_success());
    assert_eq!(api.market_hits(), 1);
    assert_eq!(api.exposure_hits(), 1);

    match renderer.last(Card::Market).unwrap().view {
        CardView::Market(snapshot) => assert_eq!(snapshot.spot_price, 5012.5),
        other => panic!("unexpected market view: {other:?}"),
    }
    match renderer.last(Card::Exposure).unwrap().view {
        CardView::Exposure(series) => {
            assert_eq!(series.strikes, vec![4980.0, 5000.0, 5020.0]);
            assert_eq!(series.puts, vec![-9.0, -3.0, -4.0]);
            assert_eq!(series.calls, vec![1.0, 5.0, 0.0]);
            assert_eq!(series.net, vec![-8.0, 2.0, 0.0]);
            assert!(!series.is_sample);
            assert!(series.title.contains("All"));
        }
        other => panic!("unexpected exposure view: {other:?}"),
    }

    let state = scheduler.state();
    assert!(!state.is_in_flight());
    assert_eq!(state.cycles_completed(), 1);
    assert!(state.snapshot().last_completed_ms.is_some());

    api.shutdown();
}

#[tokio::test]
async fn test_overlapping_cycles_are_single_flight() {
    let api = MockApi::start().await;
    api.set_delay(Duration::from_millis(200));
    let (scheduler, _renderer) = scheduler_for(&api, Duration::from_secs(60));

    let (first, second) = tokio::join!(
        scheduler.run_cycle(Trigger::Timer),
        scheduler.run_cycle(Trigger::Manual)
    );

    assert!(matches!(first, CycleOutcome::Completed(_)));
    assert_eq!(
        second,
        CycleOutcome::Skipped {
            reason: SkipReason::InFlight
        }
    );
    assert_eq!(api.market_hits(), 1);
    assert_eq!(api.exposure_hits(), 1);
    assert!(!scheduler.state().is_in_flight());

    // Slot is free again once the first cycle finished.
    assert!(!scheduler.run_cycle(Trigger::Manual).await.is_skipped());
    assert_eq!(api.market_hits(), 2);

    api.shutdown();
}

#[tokio::test]
async fn test_exposure_renders_before_slow_market_resolves() {
    let api = MockApi::start().await;
    api.set_market_delay(Duration::from_millis(400));
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));

    let cycle = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_cycle(Trigger::Manual).await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Market is still outstanding: exposure is already drawn.
    let state = scheduler.state();
    assert!(state.is_in_flight());
    assert_eq!(state.phase(), CyclePhase::Fetching);
    assert!(renderer.last(Card::Market).is_none());
    assert!(matches!(
        renderer.last(Card::Exposure).unwrap().view,
        CardView::Exposure(_)
    ));

    let outcome = cycle.await.unwrap();
    assert!(outcome.report().unwrap().is_success());

    let order: Vec<Card> = renderer.frames().iter().map(|f| f.card).collect();
    assert_eq!(order, vec![Card::Exposure, Card::Market]);
    assert_eq!(state.phase(), CyclePhase::Idle);

    api.shutdown();
}

#[tokio::test]
async fn test_paused_cycle_makes_no_requests() {
    let api = MockApi::start().await;
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));

    scheduler.set_paused(true);
    let outcome = scheduler.run_cycle(Trigger::Timer).await;
    assert_eq!(
        outcome,
        CycleOutcome::Skipped {
            reason: SkipReason::Paused
        }
    );
    assert_eq!(api.total_hits(), 0);
    assert_eq!(renderer.count(), 0);

    scheduler.set_paused(false);
    assert!(!scheduler.run_cycle(Trigger::Timer).await.is_skipped());
    assert_eq!(api.total_hits(), 2);

    api.shutdown();
}

#[tokio::test]
async fn test_exposure_failure_is_scoped_to_its_card() {
    let api = MockApi::start().await;
    api.fail_exposure(true);
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));

    let outcome = scheduler.run_cycle(Trigger::Manual).await;
    let report = outcome.report().unwrap();
    assert!(report.market_ok);
    assert!(!report.exposure_ok);
    assert_eq!(report.outcome_label(), "partial");

    assert!(matches!(
        renderer.last(Card::Market).unwrap().view,
        CardView::Market(ref s) if s.spot_price == 5012.5
    ));
    assert_eq!(
        renderer.last(Card::Exposure).unwrap().view,
        CardView::Error {
            message: ERROR_LOADING_DATA.to_string()
        }
    );

    let state = scheduler.state();
    assert_eq!(state.market().status, CardStatus::Ready);
    assert!(matches!(
        state.exposure().status,
        CardStatus::Error { ref kind, .. } if kind == "server_status"
    ));
    assert!(!state.is_in_flight());

    api.shutdown();
}

#[tokio::test]
async fn test_failure_keeps_last_good_data() {
    let api = MockApi::start().await;
    let (scheduler, _renderer) = scheduler_for(&api, Duration::from_secs(60));

    scheduler.run_cycle(Trigger::Manual).await;
    let good = scheduler.state().market().data.unwrap();

    api.fail_market(true);
    let report = scheduler.run_cycle(Trigger::Manual).await;
    assert!(!report.report().unwrap().market_ok);

    let market = scheduler.state().market();
    assert_eq!(market.data, Some(good));
    assert!(matches!(market.status, CardStatus::Error { .. }));
    assert!(scheduler
        .state()
        .current_view(Card::Market)
        .unwrap()
        .is_error());

    api.shutdown();
}

#[tokio::test]
async fn test_empty_exposure_renders_sample() {
    let api = MockApi::start().await;
    api.set_exposure_records(Vec::new());
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));

    scheduler.run_cycle(Trigger::Manual).await;

    let series = scheduler.state().exposure().data.unwrap();
    assert!(series.is_sample);
    assert!(!series.is_empty());
    assert!(matches!(
        renderer.last(Card::Exposure).unwrap().view,
        CardView::Exposure(ref s) if s.is_sample
    ));

    api.shutdown();
}

#[tokio::test]
async fn test_filter_change_refetches_with_new_query() {
    let api = MockApi::start().await;
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));
    let filter = FilterState::new(Arc::clone(&scheduler));

    scheduler.run_cycle(Trigger::Startup).await;
    assert_eq!(api.last_exposure_query().as_deref(), Some("expiry_filter=all"));

    let outcome = tokio_test::assert_ok!(filter.set_expiry("0DTE").await);
    assert_eq!(outcome.report().unwrap().trigger, Trigger::FilterChange);
    assert_eq!(api.exposure_hits(), 2);
    assert_eq!(api.last_exposure_query().as_deref(), Some("expiry_filter=0dte"));
    match renderer.last(Card::Exposure).unwrap().view {
        CardView::Exposure(series) => assert!(series.title.contains("0DTE")),
        other => panic!("unexpected exposure view: {other:?}"),
    }

    filter.set_customer("Retail").await.unwrap();
    let query = api.last_exposure_query().unwrap();
    assert!(query.contains("expiry_filter=0dte"));
    assert!(query.contains("customer_filter=retail"));
    assert_eq!(filter.current().customer, CustomerFilter::Retail);

    api.shutdown();
}

#[tokio::test]
async fn test_invalid_filter_leaves_state_unchanged() {
    let api = MockApi::start().await;
    let (scheduler, _renderer) = scheduler_for(&api, Duration::from_secs(60));
    let filter = FilterState::new(Arc::clone(&scheduler));

    assert!(filter.apply(Some("weekly"), Some("hedgefund")).await.is_err());
    assert!(filter.set_expiry("quarterly").await.is_err());

    assert_eq!(filter.current().expiry, ExpiryFilter::All);
    assert_eq!(filter.current().customer, CustomerFilter::All);
    assert_eq!(api.total_hits(), 0);

    api.shutdown();
}

#[tokio::test]
async fn test_theme_toggle_rerenders_without_fetching() {
    let api = MockApi::start().await;
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));
    let store = Arc::new(PreferenceStore::in_memory());
    let theme = ThemeManager::new(Arc::clone(&scheduler), Arc::clone(&store));

    scheduler.run_cycle(Trigger::Startup).await;
    let hits = api.total_hits();
    let frames = renderer.count();
    assert_eq!(renderer.last(Card::Market).unwrap().style.theme, ThemeMode::Dark);

    assert_eq!(theme.toggle().await, ThemeMode::Light);

    assert_eq!(api.total_hits(), hits);
    assert_eq!(renderer.count(), frames + 2);
    for card in [Card::Market, Card::Exposure] {
        let frame = renderer.last(card).unwrap();
        assert_eq!(frame.style.theme, ThemeMode::Light);
        assert_eq!(frame.style.background_color, "#ffffff");
        assert!(!frame.view.is_error());
    }
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));

    api.shutdown();
}

#[tokio::test]
async fn test_theme_toggle_before_first_load_renders_nothing() {
    let api = MockApi::start().await;
    let (scheduler, renderer) = scheduler_for(&api, Duration::from_secs(60));
    let theme = ThemeManager::new(Arc::clone(&scheduler), Arc::new(PreferenceStore::in_memory()));

    theme.toggle().await;
    assert_eq!(renderer.count(), 0);
    assert_eq!(api.total_hits(), 0);

    api.shutdown();
}

#[tokio::test]
async fn test_theme_persists_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let api = MockApi::start().await;

    {
        let (scheduler, _) = scheduler_for(&api, Duration::from_secs(60));
        let store = Arc::new(PreferenceStore::open(&path).unwrap());
        let theme = ThemeManager::new(scheduler, store);
        assert_eq!(theme.load(), ThemeMode::Dark);
        theme.toggle().await;
    }

    let (scheduler, _) = scheduler_for(&api, Duration::from_secs(60));
    let store = Arc::new(PreferenceStore::open(&path).unwrap());
    let theme = ThemeManager::new(Arc::clone(&scheduler), store);
    assert_eq!(theme.load(), ThemeMode::Light);
    assert_eq!(scheduler.state().theme(), ThemeMode::Light);

    api.shutdown();
}

#[tokio::test]
async fn test_timer_runs_cycles_until_cancelled() {
    let api = MockApi::start().await;
    let (scheduler, _renderer) = scheduler_for(&api, Duration::from_millis(50));
    let shutdown = CancellationToken::new();

    let handle = scheduler.start(shutdown.clone());
    tokio::time::sleep(Duration::from_millis(180)).await;
    assert!(api.market_hits() >= 2, "first tick is immediate");

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("timer loop should stop")
        .unwrap();

    // Let any cycle spawned before cancellation finish.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let hits = api.market_hits();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(api.market_hits(), hits);

    api.shutdown();
}
