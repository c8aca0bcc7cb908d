use std::sync::Arc;
use std::time::Duration;

use candela::{CandelaError, CandleFeed, PriceField, RawCandle, SkipReason, TimeUnit, tag_err};
use candela_mock::{MockBehavior, MockSource};

use crate::helpers::{T0, batch, candle, scripted, times};

#[tokio::test]
async fn failed_poll_keeps_the_previous_series() {
    let (b, ctrl, sink) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 3, 1.0)))
        .await;
    let feed = b.build().unwrap();
    feed.poll_once().await.unwrap();

    ctrl.set_default_behavior(MockBehavior::Fail(CandelaError::source(
        "dyn",
        "connection reset",
    )))
    .await;
    let err = feed.poll_once().await.unwrap_err();
    assert!(matches!(err, CandelaError::Source { ref provider, .. } if provider == "dyn"));

    ctrl.set_default_behavior(MockBehavior::Fail(CandelaError::invalid_batch(
        "expected an array of candles, got a string",
    )))
    .await;
    let err = feed.poll_once().await.unwrap_err();
    assert!(matches!(err, CandelaError::InvalidBatch(_)));

    assert_eq!(times(&feed.series()), vec![T0, T0 + 300, T0 + 600]);
    assert_eq!(sink.render_count(), 1);
    assert_eq!(sink.clear_count(), 0);
}

#[tokio::test]
async fn unknown_symbol_is_not_found() {
    let (b, ctrl, _) = scripted();
    ctrl.set_behavior("EURUSD-OTC", MockBehavior::Return(batch(T0, 1, 1.0)))
        .await;
    let feed = b.symbol("XAUXAG").build().unwrap();
    let err = feed.poll_once().await.unwrap_err();
    assert!(matches!(err, CandelaError::NotFound { .. }), "{err}");
}

#[tokio::test(start_paused = true)]
async fn hanging_source_times_out() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Hang).await;
    let feed = b
        .source_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let err = feed.poll_once().await.unwrap_err();
    assert_eq!(err, CandelaError::source_timeout("dyn"));
    assert!(err.is_transient());
    assert!(feed.series().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_builtin_mock_symbol_trips_a_short_timeout() {
    let feed = CandleFeed::builder()
        .source(Arc::new(MockSource::new()))
        .symbol("TIMEOUT")
        .source_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = feed.poll_once().await.unwrap_err();
    assert_eq!(err, CandelaError::source_timeout("candela-mock"));

    let feed = CandleFeed::builder()
        .source(Arc::new(MockSource::new()))
        .symbol("FAIL")
        .build()
        .unwrap();
    assert!(matches!(
        feed.poll_once().await,
        Err(CandelaError::Source { .. })
    ));
}

#[tokio::test]
async fn malformed_records_are_skipped_not_fatal() {
    let (b, ctrl, _) = scripted();
    let mut records = batch(T0, 2, 1.0);
    records.push(RawCandle {
        close: Some("n/a".into()),
        ..candle(T0 + 600, 3.0)
    });
    records.push(RawCandle {
        open: None,
        ..candle(T0 + 900, 4.0)
    });
    records.push(candle(T0 + 1200, 5.0));
    ctrl.set_default_behavior(MockBehavior::Return(records)).await;
    let feed = b.build().unwrap();

    let report = feed.poll_once().await.unwrap().unwrap();
    assert_eq!(report.inserted, 3);
    let reasons: Vec<(usize, SkipReason)> =
        report.skipped.iter().map(|s| (s.index, s.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (2, SkipReason::NotNumeric(PriceField::Close)),
            (3, SkipReason::Missing(PriceField::Open)),
        ]
    );
    assert_eq!(times(&feed.series()), vec![T0, T0 + 300, T0 + 1200]);
}

#[tokio::test]
async fn batch_that_slips_back_to_seconds_is_dropped() {
    let (b, ctrl, sink) = scripted();
    let ms: Vec<RawCandle> = (0..3)
        .map(|i| candle((T0 + 300 * i) * 1000, 1.0 + i as f64))
        .collect();
    ctrl.set_default_behavior(MockBehavior::Return(ms)).await;
    let feed = b.time_unit(TimeUnit::Milliseconds).build().unwrap();
    feed.poll_once().await.unwrap();
    assert_eq!(times(&feed.series()), vec![T0, T0 + 300, T0 + 600]);

    // Same buckets, but the source slipped back to seconds.
    ctrl.set_default_behavior(MockBehavior::Return(batch(T0, 3, 9.0)))
        .await;
    let report = feed.poll_once().await.unwrap().unwrap();

    assert!(!report.changed());
    assert_eq!(report.skipped.len(), 3);
    assert!(report
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::UnitMismatch));
    assert_eq!(times(&feed.series()), vec![T0, T0 + 300, T0 + 600]);
    assert_eq!(feed.series().last().unwrap().close, 3.0);
    assert_eq!(sink.render_count(), 1);
}

#[tokio::test]
async fn millisecond_times_on_a_seconds_feed_are_a_unit_mismatch() {
    let (b, ctrl, _) = scripted();
    ctrl.set_default_behavior(MockBehavior::Return(vec![candle(T0 * 1000, 1.0)]))
        .await;
    let feed = b.build().unwrap();
    let report = feed.poll_once().await.unwrap().unwrap();
    assert_eq!(report.skipped[0].reason, SkipReason::UnitMismatch);
    assert!(feed.series().is_empty());
}

#[tokio::test]
async fn stray_seconds_record_in_a_millisecond_batch_is_dropped_alone() {
    let (b, ctrl, sink) = scripted();
    let records = vec![
        candle(T0 * 1000, 1.0),
        candle((T0 + 300) * 1000, 2.0),
        candle(T0 + 600, 3.0),
    ];
    ctrl.set_default_behavior(MockBehavior::Return(records)).await;
    let feed = b.time_unit(TimeUnit::Milliseconds).build().unwrap();

    let report = feed.poll_once().await.unwrap().unwrap();
    assert_eq!(report.inserted, 2);
    let reasons: Vec<(usize, SkipReason)> =
        report.skipped.iter().map(|s| (s.index, s.reason)).collect();
    assert_eq!(reasons, vec![(2, SkipReason::UnitMismatch)]);
    assert_eq!(times(&feed.series()), vec![T0, T0 + 300]);
    assert_eq!(sink.render_count(), 1);
}

#[test]
fn tag_err_keeps_classified_errors() {
    let nf = CandelaError::not_found("candles for X");
    assert_eq!(tag_err("src", nf.clone()), nf);

    let http = CandelaError::Http {
        provider: "candela-http".into(),
        status: 503,
    };
    assert_eq!(tag_err("src", http.clone()), http);

    let to = CandelaError::source_timeout("candela-http");
    assert_eq!(tag_err("src", to.clone()), to);

    let bad = CandelaError::invalid_batch("nope");
    assert_eq!(tag_err("src", bad.clone()), bad);
}

#[test]
fn tag_err_wraps_anything_else_with_the_source_name() {
    let tagged = tag_err("src", CandelaError::Other("boom".into()));
    match tagged {
        CandelaError::Source { provider, msg } => {
            assert_eq!(provider, "src");
            assert!(msg.contains("boom"), "{msg}");
        }
        other => panic!("unexpected {other:?}"),
    }
}
