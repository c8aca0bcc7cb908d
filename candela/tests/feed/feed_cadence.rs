use std::sync::Arc;
use std::time::Duration;

use candela::{BackoffConfig, CandelaError, CandleFeed, Timeframe};
use candela_mock::{MockBehavior, MockSource};

use crate::helpers::{T0, batch, scripted, settle};

const MS: Duration = Duration::from_millis(1);

#[tokio::test(start_paused = true)]
async fn polls_follow_the_interval() {
    let (b, ctrl, sink) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 3, 1.0)))
        .await;
    let mut feed = b.build().unwrap();
    feed.start().unwrap();

    settle().await;
    assert_eq!(ctrl.call_count().await, 1);
    tokio::time::sleep(Duration::from_millis(1_990)).await;
    assert_eq!(ctrl.call_count().await, 1);
    tokio::time::sleep(Duration::from_millis(10) + MS).await;
    assert_eq!(ctrl.call_count().await, 2);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(ctrl.call_count().await, 3);

    // Identical batches publish once.
    assert_eq!(sink.render_count(), 1);
    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn interval_is_measured_from_poll_start() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Delay(
        Duration::from_millis(500),
        batch(T0, 1, 1.0),
    ))
    .await;
    let mut feed = b.build().unwrap();
    feed.start().unwrap();

    // Starts at 0s, 2s, 4s regardless of the 500ms fetch.
    tokio::time::sleep(Duration::from_millis(2_000) + MS).await;
    assert_eq!(ctrl.call_count().await, 2);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(ctrl.call_count().await, 3);
    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn failures_keep_the_cadence_without_backoff() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Fail(CandelaError::source("dyn", "down")))
        .await;
    let mut feed = b.build().unwrap();
    feed.start().unwrap();

    tokio::time::sleep(Duration::from_millis(4_000) + MS).await;
    assert_eq!(ctrl.call_count().await, 3);
    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn backoff_stretches_after_failures_and_resets_on_success() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Fail(CandelaError::source("dyn", "down")))
        .await;
    let mut feed = b
        .poll_interval(Duration::from_secs(1))
        .backoff(BackoffConfig {
            min_backoff_ms: 5_000,
            max_backoff_ms: 20_000,
            factor: 2,
            jitter_percent: 0,
        })
        .build()
        .unwrap();
    feed.start().unwrap();

    settle().await;
    assert_eq!(ctrl.call_count().await, 1);
    // First failure: next poll at 5s, not 1s.
    tokio::time::sleep(Duration::from_millis(4_990)).await;
    assert_eq!(ctrl.call_count().await, 1);
    tokio::time::sleep(Duration::from_millis(10) + MS).await;
    assert_eq!(ctrl.call_count().await, 2);

    // Second failure doubles the wait: next poll at 15s.
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 2, 1.0)))
        .await;
    tokio::time::sleep(Duration::from_millis(9_990)).await;
    assert_eq!(ctrl.call_count().await, 2);
    tokio::time::sleep(Duration::from_millis(10) + MS).await;
    assert_eq!(ctrl.call_count().await, 3);
    assert_eq!(feed.series().len(), 2);

    // Success restores the normal interval.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(ctrl.call_count().await, 4);
    feed.stop().await;
}

#[tokio::test]
async fn series_is_capped_to_the_most_recent_candles() {
    let mut feed = CandleFeed::builder()
        .source(Arc::new(MockSource::new().advancing()))
        .timeframe(Timeframe::M1)
        .limit(5)
        .max_candles(Some(8))
        .build()
        .unwrap();

    for _ in 0..6 {
        feed.poll_once().await.unwrap();
    }
    let series = feed.series();
    assert_eq!(series.len(), 8);
    let last = series.last().unwrap().time.get();
    let first = series.first().unwrap().time.get();
    assert_eq!(last - first, 7 * 60);
    assert!(series.as_slice().windows(2).all(|w| w[0].time < w[1].time));

    // Uncapped, the same polls keep every candle.
    feed.stop().await;
    let feed = CandleFeed::builder()
        .source(Arc::new(MockSource::new().advancing()))
        .timeframe(Timeframe::M1)
        .limit(5)
        .max_candles(None)
        .build()
        .unwrap();
    for _ in 0..6 {
        feed.poll_once().await.unwrap();
    }
    assert_eq!(feed.series().len(), 10);
}
