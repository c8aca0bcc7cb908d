use std::time::Duration;

use candela::CandelaError;
use candela_mock::MockBehavior;

use crate::helpers::{EURUSD, T0, batch, scripted, settle, times};

#[tokio::test(start_paused = true)]
async fn start_polls_immediately_and_publishes() {
    let (b, ctrl, sink) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 3, 1.0)))
        .await;
    let mut feed = b.build().unwrap();
    let mut rx = feed.subscribe();

    feed.start().unwrap();
    tokio::time::timeout(Duration::from_millis(100), rx.changed())
        .await
        .expect("first poll published")
        .unwrap();

    assert_eq!(times(&rx.borrow()), vec![T0, T0 + 300, T0 + 600]);
    assert_eq!(sink.render_count(), 1);
    assert_eq!(sink.last_render().unwrap().len(), 3);

    let reqs = ctrl.requests().await;
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].symbol(), EURUSD);
    assert_eq!(reqs[0].limit(), 10);
    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_twice_is_already_running() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 1, 1.0)))
        .await;
    let mut feed = b.build().unwrap();
    feed.start().unwrap();
    assert!(feed.is_running());
    assert_eq!(feed.start(), Err(CandelaError::AlreadyRunning));
    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_halts_polling() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 1, 1.0)))
        .await;
    let mut feed = b.build().unwrap();

    // Stopping a feed that never started is fine.
    feed.stop().await;

    feed.start().unwrap();
    settle().await;
    assert_eq!(ctrl.call_count().await, 1);

    feed.stop().await;
    feed.stop().await;
    assert!(!feed.is_running());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(ctrl.call_count().await, 1);
    assert_eq!(feed.series().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn feed_can_restart_after_stop() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 2, 1.0)))
        .await;
    let mut feed = b.build().unwrap();

    feed.start().unwrap();
    settle().await;
    feed.stop().await;

    feed.start().unwrap();
    settle().await;
    assert!(feed.is_running());
    assert_eq!(ctrl.call_count().await, 2);
    // The held series survives a restart.
    assert_eq!(feed.series().len(), 2);
    feed.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_a_poll_in_flight_without_publishing() {
    let (b, ctrl, sink) = scripted();
    ctrl.set_default_behavior(MockBehavior::Delay(
        Duration::from_secs(5),
        batch(T0, 3, 1.0),
    ))
    .await;
    let mut feed = b.build().unwrap();
    feed.start().unwrap();
    settle().await;
    assert_eq!(ctrl.call_count().await, 1);

    feed.stop().await;
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(feed.series().is_empty());
    assert_eq!(sink.render_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_feed_stops_its_task() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 1, 1.0)))
        .await;
    let mut feed = b.build().unwrap();
    feed.start().unwrap();
    settle().await;
    drop(feed);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(ctrl.call_count().await, 1);
}

#[tokio::test]
async fn poll_once_works_without_the_task() {
    let (b, ctrl, sink) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 3, 1.0)))
        .await;
    let feed = b.build().unwrap();

    let report = feed.poll_once().await.unwrap().expect("selection unchanged");
    assert_eq!(report.inserted, 3);
    assert_eq!(report.replaced, 0);
    assert!(report.skipped.is_empty());
    assert_eq!(feed.series().len(), 3);
    assert_eq!(sink.render_count(), 1);

    // Same batch again: nothing changes, nothing is re-rendered.
    let report = feed.poll_once().await.unwrap().unwrap();
    assert!(!report.changed());
    assert_eq!(sink.render_count(), 1);
}

#[tokio::test]
async fn later_batches_replace_and_extend() {
    let (b, ctrl, sink) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 3, 1.0)))
        .await;
    let feed = b.build().unwrap();
    feed.poll_once().await.unwrap();

    // Last candle still forming: its close moves, and one new bucket opens.
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0 + 600, 2, 7.0)))
        .await;
    let report = feed.poll_once().await.unwrap().unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(report.replaced, 1);

    let series = feed.series();
    assert_eq!(times(&series), vec![T0, T0 + 300, T0 + 600, T0 + 900]);
    assert_eq!(series.last().unwrap().close, 8.0);
    assert_eq!(series.get(candela::EpochSeconds::new(T0 + 600)).unwrap().close, 7.0);
    assert_eq!(sink.render_count(), 2);
}

#[tokio::test]
async fn report_step_matches_the_published_series() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 4, 1.0)))
        .await;
    let feed = b.build().unwrap();
    let report = feed.poll_once().await.unwrap().unwrap();
    assert_eq!(report.step_seconds, Some(300));

    // With a cap the step is taken from what is kept, not from what arrived.
    let (b, ctrl, _) = scripted();
    let mut records = batch(T0, 3, 1.0);
    records.push(candela::RawCandle::new(T0 + 1200, 4.0, 4.5, 3.5, 4.0));
    ctrl.set_default_behavior(MockBehavior::Return(records)).await;
    let feed = b.max_candles(Some(2)).build().unwrap();
    let report = feed.poll_once().await.unwrap().unwrap();
    assert_eq!(times(&report.series), vec![T0 + 600, T0 + 1200]);
    assert_eq!(report.step_seconds, Some(600));
}
