use std::time::Duration;

use candela_core::BackoffConfig;
use rand::Rng;

/// `base_ms` plus a random extra of up to `jitter_percent` percent of it.
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Delay before the next poll after `failures` consecutive failed polls.
///
/// Never shorter than `interval`; without a backoff config failures keep the
/// normal cadence.
pub fn next_delay(interval: Duration, backoff: Option<&BackoffConfig>, failures: u32) -> Duration {
    match backoff {
        Some(cfg) if failures > 0 => {
            let ms = jitter_wait(cfg.delay_ms(failures), u32::from(cfg.jitter_percent));
            Duration::from_millis(ms).max(interval)
        }
        _ => interval,
    }
}
