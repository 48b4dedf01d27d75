use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;

/// Simple Moving Average of the last `period` prices.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub(crate) fn with_period(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn name(&self) -> &str {
        "sma"
    }

    fn required_samples(&self) -> usize {
        self.period
    }

    /// Returns 0 when fewer than `period` prices are available.
    fn compute(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.period {
            return 0.0;
        }
        let tail = &prices[prices.len() - self.period..];
        tail.iter().sum::<f64>() / self.period as f64
    }
}

/// Exponential Moving Average seeded with the first price.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    pub(crate) fn with_period(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// EMA value at every point of `prices`. Empty input gives an empty series.
    pub fn series(&self, prices: &[f64]) -> Vec<f64> {
        let k = self.multiplier();
        let mut out = Vec::with_capacity(prices.len());
        let Some(&seed) = prices.first() else {
            return out;
        };

        let mut ema = seed;
        out.push(ema);
        for &price in &prices[1..] {
            ema = price * k + ema * (1.0 - k);
            out.push(ema);
        }
        out
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn name(&self) -> &str {
        "ema"
    }

    fn required_samples(&self) -> usize {
        self.period
    }

    /// Final EMA value over the whole slice; 0 for an empty slice.
    fn compute(&self, prices: &[f64]) -> f64 {
        self.series(prices).last().copied().unwrap_or(0.0)
    }
}
