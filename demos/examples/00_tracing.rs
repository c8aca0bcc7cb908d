use candela::{CandleFeed, Timeframe};
use candela_demos::common::{get_source, poll_interval};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize a human-friendly tracing subscriber with env-based filtering.
    // Suggested: RUST_LOG=info,candela=trace,candela_http=trace
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let feed = CandleFeed::builder()
        .source(get_source())
        .symbol("EURUSD-OTC")
        .timeframe(Timeframe::M1)
        .poll_interval(poll_interval())
        .build()?;

    // Two manual polls: the first fills the series, the second reconciles into it.
    let _ = feed.poll_once().await?;
    let _ = feed.poll_once().await?;

    // An unknown symbol fails; the previous series is kept.
    feed.change_symbol("NOPE")?;
    if let Err(e) = feed.poll_once().await {
        tracing::warn!(error = %e, "expected failure for unknown symbol");
    }

    Ok(())
}
