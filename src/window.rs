use std::collections::HashMap;

use error_stack::{Report, bail};

use crate::error::SampleError;
use crate::model::PriceSample;

/// Default trailing window: five minutes.
pub const DEFAULT_WINDOW_MS: i64 = 300_000;

/// Per-symbol price history bounded to a trailing time window.
///
/// Samples are expected in non-decreasing timestamp order per symbol (they
/// come from a single polling clock); the store appends at the tail and never
/// re-sorts.
#[derive(Debug)]
pub struct RollingWindowStore {
    series: HashMap<String, Vec<PriceSample>>,
    window_ms: i64,
}

impl RollingWindowStore {
    pub fn new(window_ms: i64) -> Self {
        Self {
            series: HashMap::new(),
            window_ms,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Append a sample for `symbol` and evict everything older than the
    /// window, measured back from `timestamp`.
    ///
    /// Non-finite or non-positive prices leave the store untouched.
    pub fn append(
        &mut self,
        symbol: &str,
        price: f64,
        timestamp: i64,
    ) -> Result<(), Report<SampleError>> {
        let sample = PriceSample::new(price, timestamp);
        if !sample.is_valid() {
            bail!(SampleError::InvalidSample {
                symbol: symbol.to_owned(),
                price,
            });
        }

        self.series
            .entry(symbol.to_owned())
            .or_default()
            .push(sample);
        self.prune(symbol, timestamp, self.window_ms);
        Ok(())
    }

    /// Remove samples with `timestamp < now - window_ms`. A sample exactly at
    /// the cutoff is kept.
    pub fn prune(&mut self, symbol: &str, now: i64, window_ms: i64) {
        let Some(series) = self.series.get_mut(symbol) else {
            return;
        };
        let cutoff = now.saturating_sub(window_ms);
        series.retain(|s| s.timestamp >= cutoff);
    }

    /// Current series for `symbol`, oldest first. Unknown symbols yield an
    /// empty slice.
    pub fn get_series(&self, symbol: &str) -> &[PriceSample] {
        self.series.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn prices(&self, symbol: &str) -> Vec<f64> {
        self.get_series(symbol).iter().map(|s| s.price).collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl Default for RollingWindowStore {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symbol_has_empty_series() {
        let store = RollingWindowStore::default();
        assert!(store.get_series("BTC").is_empty());
        assert!(store.prices("BTC").is_empty());
    }

    #[test]
    fn appended_sample_is_last() {
        let mut store = RollingWindowStore::default();
        store.append("BTC", 100.0, 1_000).unwrap();
        store.append("BTC", 101.0, 2_000).unwrap();

        let series = store.get_series("BTC");
        assert_eq!(series.len(), 2);
        assert_eq!(*series.last().unwrap(), PriceSample::new(101.0, 2_000));
    }

    #[test]
    fn invalid_price_is_rejected_without_mutation() {
        let mut store = RollingWindowStore::default();
        store.append("BTC", 100.0, 1_000).unwrap();

        assert!(store.append("BTC", 0.0, 2_000).is_err());
        assert!(store.append("BTC", -5.0, 2_000).is_err());
        assert!(store.append("BTC", f64::NAN, 2_000).is_err());
        assert!(store.append("ETH", f64::INFINITY, 2_000).is_err());

        assert_eq!(store.get_series("BTC").len(), 1);
        assert!(store.get_series("ETH").is_empty());
    }

    #[test]
    fn append_evicts_expired_samples() {
        let mut store = RollingWindowStore::new(300_000);
        store.append("BTC", 100.0, 0).unwrap();
        store.append("BTC", 105.0, 200_000).unwrap();
        store.append("BTC", 110.0, 310_000).unwrap();

        // cutoff = 10_000: the t=0 sample is gone
        let series = store.get_series("BTC");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].price, 105.0);
        assert_eq!(series[1].price, 110.0);
    }

    #[test]
    fn sample_at_cutoff_is_retained() {
        let mut store = RollingWindowStore::new(300_000);
        store.append("BTC", 100.0, 10_000).unwrap();
        store.append("BTC", 101.0, 310_000).unwrap();
        assert_eq!(store.get_series("BTC").len(), 2);

        store.prune("BTC", 310_001, 300_000);
        assert_eq!(store.get_series("BTC").len(), 1);
    }

    #[test]
    fn prune_leaves_only_samples_inside_window() {
        let mut store = RollingWindowStore::new(i64::MAX);
        for t in (0..1_000_000).step_by(50_000) {
            store.append("ETH", 2_000.0 + t as f64, t).unwrap();
        }

        let now = 950_000;
        store.prune("ETH", now, DEFAULT_WINDOW_MS);
        let series = store.get_series("ETH");
        assert!(!series.is_empty());
        assert!(series.iter().all(|s| s.timestamp >= now - DEFAULT_WINDOW_MS));
    }

    #[test]
    fn symbols_are_independent() {
        let mut store = RollingWindowStore::new(1_000);
        store.append("BTC", 100.0, 0).unwrap();
        store.append("ETH", 10.0, 5_000).unwrap();

        assert_eq!(store.get_series("BTC").len(), 1);
        assert_eq!(store.get_series("ETH").len(), 1);

        let mut symbols: Vec<&str> = store.symbols().collect();
        symbols.sort_unstable();
        assert_eq!(symbols, vec!["BTC", "ETH"]);
    }

    #[test]
    fn duplicate_timestamps_are_kept() {
        let mut store = RollingWindowStore::default();
        store.append("BTC", 100.0, 1_000).unwrap();
        store.append("BTC", 100.5, 1_000).unwrap();
        assert_eq!(store.prices("BTC"), vec![100.0, 100.5]);
    }
}
