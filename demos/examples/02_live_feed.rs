use std::sync::Arc;

use candela::{CandleFeed, Timeframe};
use candela_demos::common::{PrintSink, get_source, poll_interval, run_for};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Source (mock in CI when CANDELA_DEMOS_USE_MOCK is set) and a printing sink.
    let mut feed = CandleFeed::builder()
        .source(get_source())
        .sink(Arc::new(PrintSink))
        .symbol("EURUSD-OTC")
        .timeframe(Timeframe::M1)
        .limit(50)
        .max_candles(Some(100))
        .poll_interval(poll_interval())
        .build()?;

    // 2. Watch published snapshots alongside the sink.
    let mut rx = feed.subscribe();
    feed.start()?;

    let deadline = tokio::time::sleep(run_for());
    tokio::pin!(deadline);
    let mut updates = 0usize;
    loop {
        tokio::select! {
            () = &mut deadline => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                updates += 1;
            }
        }
    }

    // 3. Stop cooperatively.
    feed.stop().await;
    println!("{updates} updates, {} candles held", feed.series().len());
    Ok(())
}
