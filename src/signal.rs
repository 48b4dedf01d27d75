use std::fmt;

use crate::config::SignalConfig;
use crate::indicator::IndicatorSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Rsi,
    Macd,
    MovingAverage,
    BollingerBands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsi => write!(f, "RSI"),
            Self::Macd => write!(f, "MACD"),
            Self::MovingAverage => write!(f, "MA"),
            Self::BollingerBands => write!(f, "BB"),
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

/// A directional annotation derived from one indicator rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub source: SignalSource,
    pub strength: Strength,
    pub description: String,
}

impl Signal {
    fn new(kind: SignalKind, source: SignalSource, strength: Strength, description: &str) -> Self {
        Self {
            kind,
            source,
            strength,
            description: description.to_owned(),
        }
    }
}

/// Applies the fixed rule set to an indicator snapshot.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    rsi_oversold: f64,
    rsi_overbought: f64,
}

impl SignalEvaluator {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            rsi_oversold: config.rsi_oversold,
            rsi_overbought: config.rsi_overbought,
        }
    }

    /// Every rule is checked independently; the result lists all signals that
    /// fired, in rule order (RSI, MACD, moving averages, Bollinger).
    pub fn evaluate(&self, indicators: &IndicatorSet, current_price: f64) -> Vec<Signal> {
        [
            self.rsi_rule(indicators.rsi),
            macd_rule(indicators),
            moving_average_rule(indicators),
            bollinger_rule(indicators, current_price),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn rsi_rule(&self, rsi: f64) -> Option<Signal> {
        if rsi < self.rsi_oversold {
            Some(Signal::new(
                SignalKind::Buy,
                SignalSource::Rsi,
                Strength::Strong,
                "Oversold",
            ))
        } else if rsi > self.rsi_overbought {
            Some(Signal::new(
                SignalKind::Sell,
                SignalSource::Rsi,
                Strength::Strong,
                "Overbought",
            ))
        } else {
            None
        }
    }
}

impl Default for SignalEvaluator {
    fn default() -> Self {
        Self::new(&SignalConfig::default())
    }
}

fn macd_rule(indicators: &IndicatorSet) -> Option<Signal> {
    let m = &indicators.macd;
    if m.histogram > 0.0 && m.macd > m.signal {
        Some(Signal::new(
            SignalKind::Buy,
            SignalSource::Macd,
            Strength::Medium,
            "Bullish crossover",
        ))
    } else if m.histogram < 0.0 && m.macd < m.signal {
        Some(Signal::new(
            SignalKind::Sell,
            SignalSource::Macd,
            Strength::Medium,
            "Bearish crossover",
        ))
    } else {
        None
    }
}

fn moving_average_rule(indicators: &IndicatorSet) -> Option<Signal> {
    let ma = &indicators.moving_averages;
    if ma.ema20 > ma.ema50 {
        Some(Signal::new(
            SignalKind::Buy,
            SignalSource::MovingAverage,
            Strength::Weak,
            "Golden cross",
        ))
    } else if ma.ema20 < ma.ema50 {
        Some(Signal::new(
            SignalKind::Sell,
            SignalSource::MovingAverage,
            Strength::Weak,
            "Death cross",
        ))
    } else {
        None
    }
}

fn bollinger_rule(indicators: &IndicatorSet, price: f64) -> Option<Signal> {
    let bb = &indicators.bollinger;
    if price <= bb.lower {
        Some(Signal::new(
            SignalKind::Buy,
            SignalSource::BollingerBands,
            Strength::Medium,
            "Below lower band",
        ))
    } else if price >= bb.upper {
        Some(Signal::new(
            SignalKind::Sell,
            SignalSource::BollingerBands,
            Strength::Medium,
            "Above upper band",
        ))
    } else {
        None
    }
}
