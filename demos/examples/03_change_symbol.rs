use std::sync::Arc;
use std::time::Duration;

use candela::{CandleFeed, Timeframe};
use candela_demos::common::{PrintSink, get_source, poll_interval};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut feed = CandleFeed::builder()
        .source(get_source())
        .sink(Arc::new(PrintSink))
        .symbol("EURUSD-OTC")
        .timeframe(Timeframe::M5)
        .poll_interval(poll_interval())
        .build()?;
    feed.start()?;
    let mut rx = feed.subscribe();

    // Wait for the first chart, then switch instrument and width.
    rx.changed().await?;
    println!("{:?}: {} candles", feed.selection(), rx.borrow().len());

    feed.change_symbol("GBPUSD-OTC")?;
    feed.change_timeframe(Timeframe::M1);

    // The switch publishes an empty series first, then the new instrument.
    loop {
        tokio::time::timeout(Duration::from_secs(15), rx.changed()).await??;
        if !rx.borrow_and_update().is_empty() {
            break;
        }
    }
    println!("{:?}: {} candles", feed.selection(), feed.series().len());

    feed.stop().await;
    Ok(())
}
