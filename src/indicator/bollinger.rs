use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::ma::Sma;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the trailing `period` prices, using the population
/// standard deviation.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        if std_dev_multiplier.is_nan() || std_dev_multiplier <= 0.0 {
            bail!(IndicatorError::InvalidParameter {
                name: "std_dev_multiplier must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            std_dev_multiplier,
        })
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerValue;

    fn name(&self) -> &str {
        "bollinger"
    }

    fn required_samples(&self) -> usize {
        self.period
    }

    fn compute(&self, prices: &[f64]) -> BollingerValue {
        if prices.len() < self.period {
            return BollingerValue::default();
        }

        let window = &prices[prices.len() - self.period..];
        let first = window[0];
        // Summing a flat window is not exact for most decimal prices.
        if window.iter().all(|&p| p == first) {
            return BollingerValue {
                upper: first,
                middle: first,
                lower: first,
            };
        }

        let middle = Sma::with_period(self.period).compute(prices);
        let variance =
            window.iter().map(|&p| (p - middle).powi(2)).sum::<f64>() / self.period as f64;
        let width = self.std_dev_multiplier * variance.sqrt();

        BollingerValue {
            upper: middle + width,
            middle,
            lower: middle - width,
        }
    }
}
