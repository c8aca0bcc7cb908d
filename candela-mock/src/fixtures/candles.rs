use candela_core::{EpochSeconds, RawCandle, RawNumber, TimeUnit, Timeframe};

/// Reference price for a known instrument; the `-OTC` suffix is ignored.
pub fn base_price(symbol: &str) -> Option<f64> {
    let s = symbol.trim().to_ascii_uppercase();
    let s = s.strip_suffix("-OTC").unwrap_or(&s);
    match s {
        "EURUSD" => Some(1.0850),
        "GBPUSD" => Some(1.2650),
        "USDJPY" => Some(150.25),
        "EURJPY" => Some(162.30),
        "AUDUSD" => Some(0.6580),
        "USDCAD" => Some(1.3720),
        _ => None,
    }
}

/// `limit` consecutive candles ending with the bucket that contains `anchor`.
///
/// Prices follow a fixed wave around the base price, so the same inputs
/// always give the same batch.
pub fn build(
    base: f64,
    timeframe: Timeframe,
    limit: u32,
    anchor: EpochSeconds,
    unit: TimeUnit,
) -> Vec<RawCandle> {
    let step = timeframe.as_seconds();
    let last = anchor.get() - anchor.get().rem_euclid(step);
    let first = last - i64::from(limit.saturating_sub(1)) * step;
    let decimals = if base > 20.0 { 3 } else { 5 };
    (0..i64::from(limit))
        .map(|i| {
            let t = first + i * step;
            let open = wave(base, t, step);
            let close = wave(base, t + step, step);
            let spread = base * 0.0004;
            let high = open.max(close) + spread * (1.0 + phase(t, 7));
            let low = open.min(close) - spread * (1.0 + phase(t, 11));
            RawCandle::new(
                time_in(t, unit),
                round(open, decimals),
                round(high, decimals),
                round(low, decimals),
                round(close, decimals),
            )
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn time_in(t: i64, unit: TimeUnit) -> RawNumber {
    match unit {
        TimeUnit::Milliseconds => RawNumber::Number((t * 1000) as f64),
        _ => RawNumber::Number(t as f64),
    }
}

#[allow(clippy::cast_precision_loss)]
fn wave(base: f64, t: i64, step: i64) -> f64 {
    let k = (t / step) as f64;
    base * (1.0 + 0.002 * (k / 9.0).sin() + 0.0007 * (k / 2.3).cos())
}

/// Deterministic value in `[0, 1)` derived from `t`.
#[allow(clippy::cast_precision_loss)]
fn phase(t: i64, salt: i64) -> f64 {
    (t.wrapping_mul(salt).rem_euclid(97)) as f64 / 97.0
}

fn round(v: f64, decimals: i32) -> f64 {
    let m = 10f64.powi(decimals);
    (v * m).round() / m
}
