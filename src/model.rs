use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed price of an instrument. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl PriceSample {
    pub fn new(price: f64, timestamp: i64) -> Self {
        Self { price, timestamp }
    }

    /// Whether the price may enter a series (finite and strictly positive).
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Latest quote of a single instrument, as delivered by a price feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    pub price: f64,
    pub change_24h_pct: Option<f64>,
    pub volume_24h: Option<f64>,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

/// Change of a symbol's price relative to the previous poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub percent: f64,
    pub direction: Direction,
}

impl PriceChange {
    pub const FLAT: Self = Self {
        percent: 0.0,
        direction: Direction::Flat,
    };

    /// `previous` of `None`, zero, or equal to `current` yields a flat change.
    pub fn between(previous: Option<f64>, current: f64) -> Self {
        let Some(prev) = previous else {
            return Self::FLAT;
        };
        if prev == 0.0 || prev == current {
            return Self::FLAT;
        }

        let percent = (current - prev) / prev * 100.0;
        let direction = if percent >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        Self { percent, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderType {
    Market,
    Limit { price: f64 },
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit { .. } => "limit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Base asset, e.g. `"BTC"`.
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub amount: f64,
    /// Last known market price; simulated market orders fill at it.
    pub reference_price: Option<f64>,
}

impl OrderRequest {
    /// Quote-currency product id used by the exchange, e.g. `"BTC-USD"`.
    pub fn product_id(&self) -> String {
        format!("{}-USD", self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub id: String,
    pub status: String,
    pub symbol: String,
    pub side: OrderSide,
    pub amount: f64,
    pub price: Option<f64>,
    pub total: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub simulated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_validity() {
        assert!(PriceSample::new(1.0, 0).is_valid());
        assert!(!PriceSample::new(0.0, 0).is_valid());
        assert!(!PriceSample::new(-3.0, 0).is_valid());
        assert!(!PriceSample::new(f64::NAN, 0).is_valid());
        assert!(!PriceSample::new(f64::INFINITY, 0).is_valid());
    }

    #[test]
    fn price_change_without_previous_is_flat() {
        assert_eq!(PriceChange::between(None, 100.0), PriceChange::FLAT);
    }

    #[test]
    fn price_change_unchanged_is_flat() {
        assert_eq!(PriceChange::between(Some(100.0), 100.0), PriceChange::FLAT);
    }

    #[test]
    fn price_change_up_and_down() {
        let up = PriceChange::between(Some(100.0), 105.0);
        assert_eq!(up.direction, Direction::Up);
        assert!((up.percent - 5.0).abs() < 1e-9);

        let down = PriceChange::between(Some(200.0), 190.0);
        assert_eq!(down.direction, Direction::Down);
        assert!((down.percent + 5.0).abs() < 1e-9);
    }

    #[test]
    fn order_side_parse_and_display() {
        assert_eq!(OrderSide::from_str("buy"), Some(OrderSide::Buy));
        assert_eq!(OrderSide::from_str("sell"), Some(OrderSide::Sell));
        assert_eq!(OrderSide::from_str("hold"), None);
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }

    #[test]
    fn order_side_serializes_lowercase() {
        let json = serde_json::to_string(&OrderSide::Buy).unwrap();
        assert_eq!(json, "\"buy\"");
    }

    #[test]
    fn product_id_appends_quote_currency() {
        let order = OrderRequest {
            symbol: "ETH".into(),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            amount: 1.0,
            reference_price: None,
        };
        assert_eq!(order.product_id(), "ETH-USD");
        assert_eq!(order.order_type.as_str(), "market");
    }
}
