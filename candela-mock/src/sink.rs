use std::sync::Mutex;

use candela_core::{CandleSeries, SeriesSink};

/// Sink that records every call, for asserting on what a feed rendered.
#[derive(Debug, Default)]
pub struct RecordingSink {
    state: Mutex<Recorded>,
}

#[derive(Debug, Default)]
struct Recorded {
    renders: Vec<CandleSeries>,
    clears: usize,
}

impl RecordingSink {
    /// An empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every rendered series, oldest first.
    #[must_use]
    pub fn renders(&self) -> Vec<CandleSeries> {
        self.state
            .lock()
            .map(|s| s.renders.clone())
            .unwrap_or_default()
    }

    /// The most recently rendered series.
    #[must_use]
    pub fn last_render(&self) -> Option<CandleSeries> {
        self.state.lock().ok().and_then(|s| s.renders.last().cloned())
    }

    /// Number of `render` calls.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.state.lock().map(|s| s.renders.len()).unwrap_or(0)
    }

    /// Number of `clear` calls.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.state.lock().map(|s| s.clears).unwrap_or(0)
    }
}

impl SeriesSink for RecordingSink {
    fn render(&self, series: &CandleSeries) {
        if let Ok(mut s) = self.state.lock() {
            s.renders.push(series.clone());
        }
    }

    fn clear(&self) {
        if let Ok(mut s) = self.state.lock() {
            s.clears += 1;
        }
    }
}
