use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candela::{CandelaError, CandleFeed, CandleRequest, CandleSource, RawCandle};
use proptest::prelude::*;

use crate::helpers::{T0, candle};

/// Serves queued batches in order, then empty batches.
struct QueueSource {
    batches: Mutex<VecDeque<Vec<RawCandle>>>,
}

#[async_trait]
impl CandleSource for QueueSource {
    fn name(&self) -> &'static str {
        "queue"
    }

    async fn fetch(&self, _req: &CandleRequest) -> Result<Vec<RawCandle>, CandelaError> {
        Ok(self
            .batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

fn arb_batch() -> impl Strategy<Value = Vec<(i64, u8)>> {
    prop::collection::vec((0i64..40, any::<u8>()), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn polled_series_matches_last_write_per_bucket(
        batches in prop::collection::vec(arb_batch(), 1..6),
        cap in prop::option::of(1usize..30),
    ) {
        let raw: VecDeque<Vec<RawCandle>> = batches
            .iter()
            .map(|b| b.iter().map(|&(k, c)| candle(T0 + k * 300, f64::from(c))).collect())
            .collect();
        let source = Arc::new(QueueSource { batches: Mutex::new(raw) });

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let series = rt.block_on(async {
            let feed = CandleFeed::builder()
                .source(source)
                .max_candles(cap)
                .build()
                .unwrap();
            for _ in 0..batches.len() {
                feed.poll_once().await.unwrap();
            }
            feed.series()
        });

        // Model: the last write per bucket, then keep the newest `cap` buckets.
        let mut model: BTreeMap<i64, u8> = BTreeMap::new();
        for b in &batches {
            let mut seen = BTreeMap::new();
            for &(k, c) in b {
                seen.insert(k, c);
            }
            let merged: BTreeMap<i64, u8> = model.into_iter().chain(seen).collect();
            model = match cap {
                Some(n) => merged.into_iter().rev().take(n).collect(),
                None => merged,
            };
        }

        let got: Vec<(i64, f64)> = series.iter().map(|p| (p.time.get(), p.close)).collect();
        let want: Vec<(i64, f64)> = model
            .into_iter()
            .map(|(k, c)| (T0 + k * 300, f64::from(c)))
            .collect();
        prop_assert_eq!(got, want);
    }
}
