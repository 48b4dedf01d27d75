use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;

/// Neutral RSI reported when there are fewer than `period + 1` prices.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Relative Strength Index.
///
/// Gains and losses are summed over every consecutive delta of the supplied
/// slice and then divided by `period`, not smoothed over a sliding
/// `period`-sized window. On a long series this departs from textbook Wilder
/// RSI; the dashboard has always reported it this way.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn name(&self) -> &str {
        "rsi"
    }

    fn required_samples(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.required_samples() {
            return NEUTRAL_RSI;
        }

        let (gains, losses) = prices
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0_f64, 0.0_f64), |(g, l), d| {
                if d > 0.0 { (g + d, l) } else { (g, l - d) }
            });

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses.abs() / self.period as f64;
        if avg_loss == 0.0 {
            return 100.0;
        }

        let rs = avg_gain / avg_loss;
        let rsi = 100.0 - 100.0 / (1.0 + rs);
        (rsi * 100.0).round() / 100.0
    }
}
