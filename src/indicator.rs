pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod rsi;

use error_stack::Report;

use crate::config::IndicatorConfig;
use crate::error::IndicatorError;
use bollinger::{BollingerBands, BollingerValue};
use ma::{Ema, Sma};
use macd::{Macd, MacdValue};
use rsi::Rsi;

/// A technical analysis indicator over a price slice.
///
/// Prices must be in ascending chronological order (oldest first); nothing
/// here sorts. Computation never fails: too little data degrades to the
/// indicator's documented neutral value.
pub trait Indicator {
    type Output;

    fn name(&self) -> &str;

    /// Minimum number of prices for a non-default result.
    fn required_samples(&self) -> usize;

    fn compute(&self, prices: &[f64]) -> Self::Output;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovingAverages {
    pub sma20: f64,
    pub ema20: f64,
    pub sma50: f64,
    pub ema50: f64,
}

/// Every indicator for one window snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub macd: MacdValue,
    pub moving_averages: MovingAverages,
    pub bollinger: BollingerValue,
}

/// Configured bundle of indicators evaluated together on each tick.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    rsi: Rsi,
    macd: Macd,
    sma_short: Sma,
    ema_short: Ema,
    sma_long: Sma,
    ema_long: Ema,
    bollinger: BollingerBands,
}

impl IndicatorEngine {
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, Report<IndicatorError>> {
        let engine = Self {
            rsi: Rsi::new(config.rsi_period)?,
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal)?,
            sma_short: Sma::new(config.ma_short)?,
            ema_short: Ema::new(config.ma_short)?,
            sma_long: Sma::new(config.ma_long)?,
            ema_long: Ema::new(config.ma_long)?,
            bollinger: BollingerBands::new(config.bollinger_period, config.bollinger_multiplier)?,
        };
        tracing::debug!(
            indicators = ?engine.describe(),
            warmup = engine.macd.required_samples().max(engine.sma_long.required_samples()),
            "indicator engine configured"
        );
        Ok(engine)
    }

    /// `name:required_samples` for every indicator in the engine.
    pub fn describe(&self) -> Vec<String> {
        vec![
            describe(&self.rsi),
            describe(&self.macd),
            describe(&self.sma_short),
            describe(&self.ema_short),
            describe(&self.sma_long),
            describe(&self.ema_long),
            describe(&self.bollinger),
        ]
    }

    /// Recompute the full indicator set from scratch.
    pub fn evaluate(&self, prices: &[f64]) -> IndicatorSet {
        IndicatorSet {
            rsi: self.rsi.compute(prices),
            macd: self.macd.compute(prices),
            moving_averages: MovingAverages {
                sma20: self.sma_short.compute(prices),
                ema20: gated(&self.ema_short, prices),
                sma50: self.sma_long.compute(prices),
                ema50: gated(&self.ema_long, prices),
            },
            bollinger: self.bollinger.compute(prices),
        }
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            rsi: Rsi::default(),
            macd: Macd::default(),
            sma_short: Sma::with_period(20),
            ema_short: Ema::with_period(20),
            sma_long: Sma::with_period(50),
            ema_long: Ema::with_period(50),
            bollinger: BollingerBands::default(),
        }
    }
}

fn describe<I: Indicator>(indicator: &I) -> String {
    format!("{}:{}", indicator.name(), indicator.required_samples())
}

/// EMA reported as 0 until a full period is available, matching SMA.
fn gated(ema: &Ema, prices: &[f64]) -> f64 {
    if prices.len() < ema.required_samples() {
        return 0.0;
    }
    ema.compute(prices)
}
