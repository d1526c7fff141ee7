//! Contract Test: Scheduling and Shutdown
//!
//! Verifies that:
//! - One tick runs per ticker item, strictly sequentially
//! - The timer's first tick comes one full period after start
//! - Cancellation stops the loop between ticks
//! - A cancelled engine keeps whatever the last completed tick committed

mod common;

use common::*;
use gdddcd_core::traits::State;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn one_tick_per_ticker_item() {
    let source = ScriptedIpSource::fixed("1.2.3.4");
    let provider = MockDnsProvider::new();
    let store = MockStateStore::new(State::new(""));
    let mut engine = engine_for(&source, &provider, &store).await;

    engine
        .run_with_ticker(tokio_stream::iter(0..3), CancellationToken::new())
        .await;

    assert_eq!(source.call_count(), 3);
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(store.write_call_count(), 1);
}

#[tokio::test]
async fn cancelled_token_runs_no_ticks() {
    let source = ScriptedIpSource::fixed("1.2.3.4");
    let provider = MockDnsProvider::new();
    let store = MockStateStore::new(State::new(""));
    let mut engine = engine_for(&source, &provider, &store).await;

    let shutdown = CancellationToken::new();
    shutdown.cancel();

    // A ticker that would never end on its own.
    engine
        .run_with_ticker(tokio_stream::pending::<()>(), shutdown)
        .await;

    assert_eq!(source.call_count(), 0);
    assert_eq!(engine.persisted_state().ip, "");
}

#[tokio::test]
async fn cancellation_stops_a_running_engine() {
    let source = ScriptedIpSource::fixed("1.2.3.4");
    let provider = MockDnsProvider::new();
    let store = MockStateStore::new(State::new(""));
    let mut engine = engine_for(&source, &provider, &store).await;

    let (tick_tx, tick_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let shutdown = CancellationToken::new();
    let token = shutdown.clone();

    let handle = tokio::spawn(async move {
        engine
            .run_with_ticker(
                tokio_stream::wrappers::UnboundedReceiverStream::new(tick_rx),
                token,
            )
            .await;
        engine
    });

    tick_tx.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();

    let engine = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("engine stops after cancellation")
        .expect("engine task does not panic");

    assert_eq!(source.call_count(), 1);
    assert_eq!(engine.acknowledged_ip(), "1.2.3.4");
    assert_eq!(engine.persisted_state().ip, "1.2.3.4");
}

#[tokio::test(start_paused = true)]
async fn timer_ticks_once_per_interval() {
    let source = ScriptedIpSource::fixed("1.2.3.4");
    let provider = MockDnsProvider::new();
    let store = MockStateStore::new(State::new(""));
    let mut engine = engine_for(&source, &provider, &store).await;

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    let handle = tokio::spawn(async move {
        engine.run(token).await;
        engine
    });

    // No immediate tick at start.
    tokio::time::sleep(TEST_INTERVAL - Duration::from_secs(1)).await;
    assert_eq!(source.call_count(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.call_count(), 1);

    tokio::time::sleep(TEST_INTERVAL * 2).await;
    assert_eq!(source.call_count(), 3);

    shutdown.cancel();
    let engine = handle.await.unwrap();

    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(engine.persisted_state().ip, "1.2.3.4");
}
