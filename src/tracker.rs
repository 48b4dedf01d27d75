use std::collections::HashMap;

use error_stack::Report;

use crate::error::SampleError;
use crate::indicator::{IndicatorEngine, IndicatorSet};
use crate::model::{PriceChange, Ticker};
use crate::signal::{Signal, SignalEvaluator};
use crate::window::RollingWindowStore;

/// Everything the presentation side needs about one symbol after a tick.
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub symbol: String,
    pub price: f64,
    pub change: PriceChange,
    /// Change from the oldest sample still in the window; flat until the
    /// window holds at least two samples.
    pub window_change: PriceChange,
    pub volume_24h: Option<f64>,
    pub sample_count: usize,
    pub oldest_price: Option<f64>,
    pub indicators: IndicatorSet,
    pub signals: Vec<Signal>,
}

/// Mutable state of one tracking session.
///
/// Created at startup and dropped at shutdown; owned by the single polling
/// task, so every symbol has exactly one writer.
pub struct Tracker {
    store: RollingWindowStore,
    engine: IndicatorEngine,
    evaluator: SignalEvaluator,
    last_prices: HashMap<String, f64>,
}

impl Tracker {
    pub fn new(
        store: RollingWindowStore,
        engine: IndicatorEngine,
        evaluator: SignalEvaluator,
    ) -> Self {
        Self {
            store,
            engine,
            evaluator,
            last_prices: HashMap::new(),
        }
    }

    /// Append the ticker to its series and recompute indicators and signals
    /// over the current window.
    ///
    /// An invalid price leaves all state untouched.
    pub fn ingest(&mut self, ticker: &Ticker) -> Result<SymbolReport, Report<SampleError>> {
        let symbol = ticker.symbol.as_str();
        self.store.append(symbol, ticker.price, ticker.timestamp_ms)?;

        let change = PriceChange::between(self.last_prices.get(symbol).copied(), ticker.price);
        self.last_prices.insert(symbol.to_owned(), ticker.price);

        let prices = self.store.prices(symbol);
        let window_change = if prices.len() > 1 {
            PriceChange::between(prices.first().copied(), ticker.price)
        } else {
            PriceChange::FLAT
        };
        let indicators = self.engine.evaluate(&prices);
        let signals = self.evaluator.evaluate(&indicators, ticker.price);

        Ok(SymbolReport {
            symbol: symbol.to_owned(),
            price: ticker.price,
            change,
            window_change,
            volume_24h: ticker.volume_24h,
            sample_count: prices.len(),
            oldest_price: prices.first().copied(),
            indicators,
            signals,
        })
    }

    pub fn store(&self) -> &RollingWindowStore {
        &self.store
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(
            RollingWindowStore::default(),
            IndicatorEngine::default(),
            SignalEvaluator::default(),
        )
    }
}
