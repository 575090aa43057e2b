use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use candela_core::feed::{CandleProvider, FetchRange, MarketFeed, TickProvider};
use candela_core::{Candle, CandelaError, Interval, Tick, VolumeMode};

/// Instruction for how a method should behave for a given subject.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(CandelaError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

#[derive(Default)]
struct InternalState {
    tick_rules: HashMap<String, MockBehavior<Vec<Tick>>>,
    candle_rules: HashMap<String, MockBehavior<Vec<Candle>>>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    tick_calls: Arc<AtomicUsize>,
    candle_calls: Arc<AtomicUsize>,
}

impl DynamicMockController {
    /// Set the behavior for `ticks` calls for a specific subject.
    pub async fn set_tick_behavior(&self, subject: &str, behavior: MockBehavior<Vec<Tick>>) {
        let mut guard = self.state.lock().await;
        guard.tick_rules.insert(subject.to_string(), behavior);
    }

    /// Set the behavior for `candles` calls for a specific subject.
    pub async fn set_candle_behavior(&self, subject: &str, behavior: MockBehavior<Vec<Candle>>) {
        let mut guard = self.state.lock().await;
        guard.candle_rules.insert(subject.to_string(), behavior);
    }

    /// Total number of `ticks` calls the feed has received.
    #[must_use]
    pub fn tick_calls(&self) -> usize {
        self.tick_calls.load(Ordering::SeqCst)
    }

    /// Total number of `candles` calls the feed has received.
    #[must_use]
    pub fn candle_calls(&self) -> usize {
        self.candle_calls.load(Ordering::SeqCst)
    }

    /// Clear all configured behaviors.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.tick_rules.clear();
        guard.candle_rules.clear();
    }
}

/// A feed that defers all behavior to an external controller.
///
/// Subjects without a configured rule answer `NotFound`, so tests fail loudly
/// on unplanned calls instead of producing data from nowhere.
pub struct DynamicMockFeed {
    name: &'static str,
    volume_mode: VolumeMode,
    tick_capable: bool,
    supported: &'static [Interval],
    state: Arc<Mutex<InternalState>>,
    tick_calls: Arc<AtomicUsize>,
    candle_calls: Arc<AtomicUsize>,
}

impl DynamicMockFeed {
    /// Create a named dynamic feed and its controller.
    #[must_use]
    pub fn new(name: &'static str) -> (Self, DynamicMockController) {
        Self::with_intervals(name, &[])
    }

    /// Create a dynamic feed advertising native-candle support for `supported`.
    #[must_use]
    pub fn with_intervals(
        name: &'static str,
        supported: &'static [Interval],
    ) -> (Self, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let tick_calls = Arc::new(AtomicUsize::new(0));
        let candle_calls = Arc::new(AtomicUsize::new(0));
        let feed = Self {
            name,
            volume_mode: VolumeMode::Sum,
            tick_capable: true,
            supported,
            state: state.clone(),
            tick_calls: tick_calls.clone(),
            candle_calls: candle_calls.clone(),
        };
        let controller = DynamicMockController {
            state,
            tick_calls,
            candle_calls,
        };
        (feed, controller)
    }

    /// Override the advertised volume mode.
    #[must_use]
    pub const fn with_volume_mode(mut self, mode: VolumeMode) -> Self {
        self.volume_mode = mode;
        self
    }

    /// Drop tick capability, leaving a candle-only feed.
    #[must_use]
    pub const fn without_ticks(mut self) -> Self {
        self.tick_capable = false;
        self
    }

    async fn run<T: Clone>(rule: Option<MockBehavior<T>>, what: String) -> Result<T, CandelaError> {
        match rule {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
            None => Err(CandelaError::not_found(what)),
        }
    }
}

#[async_trait]
impl MarketFeed for DynamicMockFeed {
    fn name(&self) -> &'static str {
        self.name
    }
    fn vendor(&self) -> &'static str {
        "Mock"
    }
    fn volume_mode(&self) -> VolumeMode {
        self.volume_mode
    }

    fn as_tick_provider(&self) -> Option<&dyn TickProvider> {
        if self.tick_capable {
            Some(self as &dyn TickProvider)
        } else {
            None
        }
    }
    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        if self.supported.is_empty() {
            None
        } else {
            Some(self as &dyn CandleProvider)
        }
    }
}

#[async_trait]
impl TickProvider for DynamicMockFeed {
    async fn ticks(&self, subject: &str, _range: FetchRange) -> Result<Vec<Tick>, CandelaError> {
        self.tick_calls.fetch_add(1, Ordering::SeqCst);
        let rule = {
            let guard = self.state.lock().await;
            guard.tick_rules.get(subject).cloned()
        };
        Self::run(rule, format!("ticks for {subject}")).await
    }
}

#[async_trait]
impl CandleProvider for DynamicMockFeed {
    async fn candles(
        &self,
        subject: &str,
        _interval: Interval,
        _range: FetchRange,
    ) -> Result<Vec<Candle>, CandelaError> {
        self.candle_calls.fetch_add(1, Ordering::SeqCst);
        let rule = {
            let guard = self.state.lock().await;
            guard.candle_rules.get(subject).cloned()
        };
        Self::run(rule, format!("candles for {subject}")).await
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        self.supported
    }
}
