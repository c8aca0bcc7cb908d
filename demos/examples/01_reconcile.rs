use candela::{CandleSeries, RawCandle, SeriesReconciler, TimeUnit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. A reconciler for a source that reports milliseconds.
    let reconciler = SeriesReconciler::new(TimeUnit::Milliseconds);

    // 2. A first batch: two good candles, one with a non-numeric close.
    let first = vec![
        RawCandle::new(1_700_000_000_000_i64, 1.0850, 1.0862, 1.0848, 1.0859),
        RawCandle::new(1_700_000_300_000_i64, "1.0859", "1.0871", "1.0855", "1.0866"),
        RawCandle::new(1_700_000_600_000_i64, 1.0866, 1.0870, 1.0861, "n/a"),
    ];
    let report = reconciler.reconcile_with_report(&CandleSeries::new(), &first);
    println!(
        "first batch: inserted={} replaced={} skipped={:?}",
        report.inserted, report.replaced, report.skipped
    );

    // 3. The next batch revises the last candle and opens a new one.
    let second = vec![
        RawCandle::new(1_700_000_300_000_i64, 1.0859, 1.0875, 1.0855, 1.0873),
        RawCandle::new(1_700_000_600_000_i64, 1.0873, 1.0880, 1.0869, 1.0877),
    ];
    let report = reconciler.reconcile_with_report(&report.series, &second);
    println!(
        "second batch: inserted={} replaced={} skipped={}",
        report.inserted,
        report.replaced,
        report.skipped.len()
    );

    // 4. Raw JSON payloads go through the same path.
    let payload = br#"{"candles": [{"from": 1700000900000, "open": "1.0877",
        "high": "1.0881", "low": "1.0870", "close": "1.0872"}]}"#;
    let report = reconciler.reconcile_payload(&report.series, payload)?;

    for c in report.series.iter() {
        println!("{} o={} h={} l={} c={}", c.time, c.open, c.high, c.low, c.close);
    }
    Ok(())
}
