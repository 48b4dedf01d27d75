use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Ema;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Moving Average Convergence Divergence.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    slow_period: usize,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods must be > 0".into(),
            });
        }
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                name: "fast_period must be < slow_period".into(),
            });
        }
        Ok(Self {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            signal: Ema::new(signal_period)?,
            slow_period,
        })
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: Ema::with_period(12),
            slow: Ema::with_period(26),
            signal: Ema::with_period(9),
            slow_period: 26,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn name(&self) -> &str {
        "macd"
    }

    fn required_samples(&self) -> usize {
        self.slow_period
    }

    /// Zeros until `slow_period` prices are available. The MACD line is the
    /// point-wise difference of the fast and slow EMA series; the signal is
    /// the EMA of that line, both read at the newest point.
    fn compute(&self, prices: &[f64]) -> MacdValue {
        if prices.len() < self.slow_period {
            return MacdValue::default();
        }

        let fast = self.fast.series(prices);
        let slow = self.slow.series(prices);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let macd = line.last().copied().unwrap_or(0.0);
        let signal = self.signal.compute(&line);
        MacdValue {
            macd,
            signal,
            histogram: macd - signal,
        }
    }
}
