use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::feed::PriceFeed;
use crate::model::Ticker;

const FEED_NAME: &str = "coindesk";

/// Spot `latest/tick` endpoint returning one entry per instrument.
pub struct CoinDeskFeed {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: String,
    market: String,
    instruments: String,
    api_key: Option<String>,
}

impl CoinDeskFeed {
    pub fn new(config: &FeedConfig) -> Result<Self, Report<FeedError>> {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(nonzero!(1u32));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("crypto-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .change_context(FeedError::Request {
                feed: FEED_NAME.into(),
            })?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            base_url: config.base_url.clone(),
            market: config.market.clone(),
            instruments: config.instruments.join(","),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }
}

impl PriceFeed for CoinDeskFeed {
    fn name(&self) -> &str {
        FEED_NAME
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Ticker>, Report<FeedError>>> {
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            let mut params = vec![
                ("market", self.market.as_str()),
                ("instruments", self.instruments.as_str()),
                ("apply_mapping", "true"),
            ];
            if let Some(key) = &self.api_key {
                params.push(("api_key", key.as_str()));
            }

            let response = self
                .client
                .get(&self.base_url)
                .query(&params)
                .send()
                .await
                .change_context(FeedError::Request {
                    feed: FEED_NAME.into(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Report::new(FeedError::Status {
                    feed: FEED_NAME.into(),
                    status: status.as_u16(),
                }));
            }

            let body = response.text().await.change_context(FeedError::Request {
                feed: FEED_NAME.into(),
            })?;

            let tickers = parse_tick_response(&body, Utc::now().timestamp_millis())?;
            debug!(count = tickers.len(), "coindesk tick fetch complete");
            Ok(tickers)
        })
    }
}

// ── Response types ────────────────────────────────────────────────────────────

/// `{ "Data": { "BTC-USD": { ... } }, "Err": { ... } }`
#[derive(Debug, Deserialize)]
struct TickResponse {
    #[serde(rename = "Data", default)]
    data: BTreeMap<String, TickEntry>,
}

#[derive(Debug, Deserialize)]
struct TickEntry {
    #[serde(rename = "INSTRUMENT")]
    instrument: Option<String>,
    #[serde(rename = "BASE")]
    base: Option<String>,
    #[serde(rename = "PRICE")]
    price: Option<serde_json::Value>,
    #[serde(rename = "MOVING_24_HOUR_CHANGE_PERCENTAGE")]
    change_24h_pct: Option<f64>,
    #[serde(rename = "MOVING_24_HOUR_QUOTE_VOLUME")]
    volume_24h: Option<f64>,
}

impl TickEntry {
    fn symbol(&self, key: &str) -> String {
        if let Some(base) = self.base.as_deref().filter(|b| !b.is_empty()) {
            return base.to_owned();
        }
        let instrument = self.instrument.as_deref().unwrap_or(key);
        instrument
            .strip_suffix("-USD")
            .unwrap_or(instrument)
            .to_owned()
    }

    /// Prices arrive as numbers, but some mappings send them as strings.
    fn price(&self) -> Option<f64> {
        match self.price.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Parse a tick payload into tickers stamped with `timestamp_ms`.
///
/// Entries without a usable price are skipped; a payload with no entries at
/// all is a parse error.
fn parse_tick_response(body: &str, timestamp_ms: i64) -> Result<Vec<Ticker>, Report<FeedError>> {
    let response: TickResponse =
        serde_json::from_str(body).change_context(FeedError::ResponseParse {
            feed: FEED_NAME.into(),
        })?;

    if response.data.is_empty() {
        return Err(Report::new(FeedError::ResponseParse {
            feed: FEED_NAME.into(),
        })
        .attach("response contained no instruments"));
    }

    let tickers = response
        .data
        .iter()
        .filter_map(|(key, entry)| {
            let Some(price) = entry.price() else {
                warn!(instrument = %key, "tick entry without numeric price, skipping");
                return None;
            };
            Some(Ticker {
                symbol: entry.symbol(key),
                price,
                change_24h_pct: entry.change_24h_pct,
                volume_24h: entry.volume_24h,
                timestamp_ms,
            })
        })
        .collect();

    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mapped_tick_response() {
        let body = r#"{
            "Data": {
                "BTC-USD": {
                    "TYPE": "985",
                    "MARKET": "coinbase",
                    "INSTRUMENT": "BTC-USD",
                    "BASE": "BTC",
                    "QUOTE": "USD",
                    "PRICE": 64250.12,
                    "MOVING_24_HOUR_CHANGE_PERCENTAGE": 1.75,
                    "MOVING_24_HOUR_QUOTE_VOLUME": 1250000000.0
                },
                "ETH-USD": {
                    "INSTRUMENT": "ETH-USD",
                    "BASE": "ETH",
                    "PRICE": "3120.5"
                }
            },
            "Err": {}
        }"#;

        let tickers = parse_tick_response(body, 1_700_000_000_000).unwrap();
        assert_eq!(tickers.len(), 2);

        let btc = &tickers[0];
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.price, 64250.12);
        assert_eq!(btc.change_24h_pct, Some(1.75));
        assert_eq!(btc.volume_24h, Some(1_250_000_000.0));
        assert_eq!(btc.timestamp_ms, 1_700_000_000_000);

        let eth = &tickers[1];
        assert_eq!(eth.symbol, "ETH");
        assert_eq!(eth.price, 3120.5);
        assert_eq!(eth.change_24h_pct, None);
    }

    #[test]
    fn symbol_falls_back_to_instrument() {
        let body = r#"{"Data": {"BNB-USD": {"INSTRUMENT": "BNB-USD", "PRICE": 580.0}}}"#;
        let tickers = parse_tick_response(body, 0).unwrap();
        assert_eq!(tickers[0].symbol, "BNB");
    }

    #[test]
    fn entries_without_price_are_skipped() {
        let body = r#"{"Data": {
            "BTC-USD": {"BASE": "BTC", "PRICE": 1.0},
            "XYZ-USD": {"BASE": "XYZ", "PRICE": "n/a"},
            "ABC-USD": {"BASE": "ABC"}
        }}"#;
        let tickers = parse_tick_response(body, 0).unwrap();
        assert_eq!(tickers.len(), 1);
        assert_eq!(tickers[0].symbol, "BTC");
    }

    #[test]
    fn empty_payload_is_error() {
        assert!(parse_tick_response(r#"{"Data": {}, "Err": {}}"#, 0).is_err());
        assert!(parse_tick_response(r#"{"Err": {"message": "bad key"}}"#, 0).is_err());
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(parse_tick_response("<html>", 0).is_err());
    }

    #[test]
    fn feed_builds_from_default_config() {
        let feed = CoinDeskFeed::new(&FeedConfig::default()).unwrap();
        assert_eq!(feed.name(), "coindesk");
        assert_eq!(feed.instruments, "BTC-USD,ETH-USD,BNB-USD");
        assert!(feed.api_key.is_none());
    }

    /// Integration test: requires network access. Run with `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn integration_fetch_ticks() {
        let feed = CoinDeskFeed::new(&FeedConfig::default()).unwrap();
        let tickers = feed.fetch().await.unwrap();
        assert!(!tickers.is_empty());
    }
}
