use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use candela_core::{CandelaError, CandleRequest, CandleSource, RawCandle};

/// Instruction for how a fetch should behave for a given symbol.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after a delay (simulate a slow response).
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(CandelaError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    rules: HashMap<String, MockBehavior<Vec<RawCandle>>>,
    default_rule: Option<MockBehavior<Vec<RawCandle>>>,
    requests: Vec<CandleRequest>,
}

/// Concurrency gauge, kept outside the async lock so a cancelled fetch can
/// release its slot from `Drop`.
#[derive(Default)]
struct Gauge {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Holds one in-flight slot until the fetch ends or is cancelled.
struct InFlight(Arc<Gauge>);

impl InFlight {
    fn enter(gauge: &Arc<Gauge>) -> Self {
        let now = gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(gauge))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    gauge: Arc<Gauge>,
}

impl DynamicMockController {
    /// Set the behavior for fetches of a specific symbol.
    pub async fn set_behavior(
        &self,
        symbol: impl Into<String>,
        behavior: MockBehavior<Vec<RawCandle>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.rules.insert(symbol.into(), behavior);
    }

    /// Set the behavior for symbols without a specific rule.
    pub async fn set_default_behavior(&self, behavior: MockBehavior<Vec<RawCandle>>) {
        let mut guard = self.state.lock().await;
        guard.default_rule = Some(behavior);
    }

    /// Return a copy of the request log, oldest first.
    pub async fn requests(&self) -> Vec<CandleRequest> {
        let guard = self.state.lock().await;
        guard.requests.clone()
    }

    /// Number of fetches started so far.
    pub async fn call_count(&self) -> usize {
        let guard = self.state.lock().await;
        guard.requests.len()
    }

    /// Highest number of fetches that were in progress at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.gauge.max_in_flight.load(Ordering::SeqCst)
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.rules.clear();
        guard.default_rule = None;
        guard.requests.clear();
        self.gauge.max_in_flight.store(
            self.gauge.in_flight.load(Ordering::SeqCst),
            Ordering::SeqCst,
        );
    }
}

/// A source that defers all behavior to an external controller.
///
/// Symbols without a rule (and no default rule) fail with `NotFound`.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
    gauge: Arc<Gauge>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let gauge = Arc::new(Gauge::default());
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            gauge: Arc::clone(&gauge),
        };
        (Arc::new(Self { name, state, gauge }), controller)
    }
}

#[async_trait]
impl CandleSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, req: &CandleRequest) -> Result<Vec<RawCandle>, CandelaError> {
        let _slot = InFlight::enter(&self.gauge);
        // Acquire behavior snapshot without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            guard
                .rules
                .get(req.symbol())
                .or(guard.default_rule.as_ref())
                .cloned()
        };

        match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Delay(d, v)) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(CandelaError::not_found(format!(
                "candles for {}",
                req.symbol()
            ))),
        }
    }
}
