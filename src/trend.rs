use std::fmt;

use crate::model::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Bullish,
    Positive,
    Neutral,
    Negative,
    Bearish,
}

impl Sentiment {
    /// Classify an average 24h change in percent.
    pub fn from_average_change(avg: f64) -> Self {
        if avg > 2.0 {
            Self::Bullish
        } else if avg > 0.5 {
            Self::Positive
        } else if avg < -2.0 {
            Self::Bearish
        } else if avg < -0.5 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::Bullish => "market is strongly bullish with significant gains",
            Self::Positive => "market sentiment is positive with moderate gains",
            Self::Neutral => "market is showing mixed or neutral sentiment",
            Self::Negative => "market sentiment is negative with moderate declines",
            Self::Bearish => "market is bearish with significant declines",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

/// Aggregate of the 24h change across one batch of tickers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketTrend {
    pub average_change_pct: f64,
    pub gainers: usize,
    pub losers: usize,
    pub neutral: usize,
    pub sentiment: Sentiment,
}

impl MarketTrend {
    /// Tickers without a 24h change count as unchanged.
    pub fn from_tickers(tickers: &[Ticker]) -> Self {
        if tickers.is_empty() {
            return Self {
                average_change_pct: 0.0,
                gainers: 0,
                losers: 0,
                neutral: 0,
                sentiment: Sentiment::Neutral,
            };
        }

        let changes: Vec<f64> = tickers
            .iter()
            .map(|t| t.change_24h_pct.unwrap_or(0.0))
            .collect();
        let average = changes.iter().sum::<f64>() / changes.len() as f64;
        let gainers = changes.iter().filter(|&&c| c > 0.0).count();
        let losers = changes.iter().filter(|&&c| c < 0.0).count();

        Self {
            average_change_pct: average,
            gainers,
            losers,
            neutral: changes.len() - gainers - losers,
            sentiment: Sentiment::from_average_change(average),
        }
    }
}
