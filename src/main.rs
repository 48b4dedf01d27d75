mod config;
mod error;
mod execution;
mod feed;
mod indicator;
mod model;
mod notifier;
mod signal;
mod tracker;
mod trend;
mod window;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use execution::build_executor;
use feed::PriceFeed;
use feed::coindesk::CoinDeskFeed;
use indicator::IndicatorEngine;
use model::{OrderRequest, OrderSide, OrderType};
use notifier::Notifier;
use notifier::terminal::TerminalNotifier;
use signal::SignalEvaluator;
use tracker::Tracker;
use trend::MarketTrend;
use window::RollingWindowStore;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("price feed error")]
    Feed,
    #[display("order execution error")]
    Execution,
    #[display("runtime error")]
    Runtime,
}

#[derive(Parser)]
#[command(name = "crypto-pulse", about = "Crypto price tracker with technical signals")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the price feed and report indicators and signals (default)
    Watch,
    /// Place a single order through the configured executor
    Trade {
        /// Base asset, e.g. BTC
        #[arg(long)]
        symbol: String,
        /// "buy" or "sell"
        #[arg(long, value_parser = parse_side)]
        side: OrderSide,
        #[arg(long)]
        amount: f64,
        /// Limit price; omit for a market order
        #[arg(long)]
        price: Option<f64>,
        /// Market price used to value simulated market fills
        #[arg(long)]
        reference_price: Option<f64>,
    },
}

fn parse_side(s: &str) -> Result<OrderSide, String> {
    OrderSide::from_str(&s.to_lowercase()).ok_or_else(|| format!("unknown side \"{s}\""))
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => watch(&config).await,
        Command::Trade {
            symbol,
            side,
            amount,
            price,
            reference_price,
        } => {
            let order_type = match price {
                Some(price) => OrderType::Limit { price },
                None => OrderType::Market,
            };
            let order = OrderRequest {
                symbol: symbol.to_uppercase(),
                side,
                order_type,
                amount,
                reference_price,
            };
            trade(&config, order).await
        }
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

async fn watch(config: &AppConfig) -> Result<(), Report<AppError>> {
    let feed: Arc<dyn PriceFeed> =
        Arc::new(CoinDeskFeed::new(&config.feed).change_context(AppError::Feed)?);
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);
    let tracker = Tracker::new(
        RollingWindowStore::new(config.window.duration_ms),
        IndicatorEngine::from_config(&config.indicators).change_context(AppError::Config)?,
        SignalEvaluator::new(&config.signals),
    );
    let poll_interval = Duration::from_secs(config.feed.poll_interval_secs);

    info!(
        feed = feed.name(),
        instruments = ?config.feed.instruments,
        poll_secs = config.feed.poll_interval_secs,
        window_ms = config.window.duration_ms,
        "starting price tracking"
    );

    // ── Polling task ──────────────────────────────────────────────────────────
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(poll_loop(
        feed,
        notifier,
        tracker,
        poll_interval,
        cancel.clone(),
    ));

    // ── Shutdown ──────────────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .change_context(AppError::Runtime)?;

    info!("ctrl+c received, shutting down");
    cancel.cancel();

    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;

    info!("shutdown complete");
    Ok(())
}

async fn trade(config: &AppConfig, order: OrderRequest) -> Result<(), Report<AppError>> {
    let executor = build_executor(&config.execution).change_context(AppError::Execution)?;
    info!(
        executor = executor.name(),
        symbol = %order.symbol,
        side = %order.side,
        order_type = order.order_type.as_str(),
        amount = order.amount,
        "placing order"
    );

    let receipt = executor
        .execute(order)
        .await
        .change_context(AppError::Execution)?;

    info!(
        id = %receipt.id,
        status = %receipt.status,
        price = ?receipt.price,
        total = ?receipt.total,
        simulated = receipt.simulated,
        "order complete"
    );
    Ok(())
}

/// Owns the tracker for the whole session; one poll per tick until cancelled.
async fn poll_loop(
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn Notifier>,
    mut tracker: Tracker,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let store = tracker.store();
                tracing::debug!(
                    symbols = store.symbols().count(),
                    window_ms = store.window_ms(),
                    "poll loop cancelled"
                );
                break;
            }
            _ = ticker.tick() => {
                poll_once(feed.as_ref(), notifier.as_ref(), &mut tracker).await;
            }
        }
    }
}

/// One fetch-ingest-report pass. Returns the number of symbols reported.
///
/// A failed fetch is logged and skipped; the next tick tries again.
async fn poll_once(feed: &dyn PriceFeed, notifier: &dyn Notifier, tracker: &mut Tracker) -> usize {
    let tickers = match feed.fetch().await {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = ?e, feed = feed.name(), "price fetch failed (continuing)");
            return 0;
        }
    };

    let mut reported = 0;
    for ticker in &tickers {
        match tracker.ingest(ticker) {
            Ok(report) => {
                notifier.report(&report);
                reported += 1;
            }
            Err(e) => {
                tracing::warn!(error = ?e, symbol = %ticker.symbol, "sample dropped");
            }
        }
    }

    if !tickers.is_empty() {
        notifier.report_trend(&MarketTrend::from_tickers(&tickers));
    }
    reported
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::future::BoxFuture;

    use super::*;
    use crate::error::FeedError;
    use crate::model::Ticker;
    use crate::tracker::SymbolReport;

    struct StaticFeed {
        tickers: Mutex<Vec<Vec<Ticker>>>,
    }

    impl PriceFeed for StaticFeed {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(&self) -> BoxFuture<'_, Result<Vec<Ticker>, Report<FeedError>>> {
            Box::pin(async move {
                let next = self.tickers.lock().unwrap().pop();
                next.ok_or_else(|| {
                    Report::new(FeedError::Request {
                        feed: "static".into(),
                    })
                })
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        reports: Mutex<Vec<SymbolReport>>,
        trends: Mutex<Vec<MarketTrend>>,
    }

    impl Notifier for RecordingNotifier {
        fn report(&self, report: &SymbolReport) {
            self.reports.lock().unwrap().push(report.clone());
        }

        fn report_trend(&self, trend: &MarketTrend) {
            self.trends.lock().unwrap().push(*trend);
        }
    }

    fn ticker(symbol: &str, price: f64, timestamp_ms: i64) -> Ticker {
        Ticker {
            symbol: symbol.into(),
            price,
            change_24h_pct: Some(1.0),
            volume_24h: None,
            timestamp_ms,
        }
    }

    #[tokio::test]
    async fn poll_once_reports_valid_tickers_and_trend() {
        let feed = StaticFeed {
            tickers: Mutex::new(vec![vec![
                ticker("BTC", 64_000.0, 0),
                ticker("ETH", f64::NAN, 0),
                ticker("BNB", 580.0, 0),
            ]]),
        };
        let notifier = RecordingNotifier::default();
        let mut tracker = Tracker::default();

        let reported = poll_once(&feed, &notifier, &mut tracker).await;

        assert_eq!(reported, 2);
        let reports = notifier.reports.lock().unwrap();
        assert_eq!(reports[0].symbol, "BTC");
        assert_eq!(reports[1].symbol, "BNB");
        assert_eq!(notifier.trends.lock().unwrap().len(), 1);
        assert!(tracker.store().get_series("ETH").is_empty());
    }

    #[tokio::test]
    async fn poll_once_survives_feed_failure() {
        let feed = StaticFeed {
            tickers: Mutex::new(Vec::new()),
        };
        let notifier = RecordingNotifier::default();
        let mut tracker = Tracker::default();

        assert_eq!(poll_once(&feed, &notifier, &mut tracker).await, 0);
        assert!(notifier.reports.lock().unwrap().is_empty());
        assert!(notifier.trends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn poll_loop_stops_on_cancel() {
        let feed: Arc<dyn PriceFeed> = Arc::new(StaticFeed {
            tickers: Mutex::new(vec![vec![ticker("BTC", 1.0, 0)]]),
        });
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(poll_loop(
            feed,
            notifier,
            Tracker::default(),
            Duration::from_millis(10),
            cancel.clone(),
        ));
        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poll loop did not stop")
            .unwrap();
    }

    #[test]
    fn side_parser_is_case_insensitive() {
        assert_eq!(parse_side("BUY"), Ok(OrderSide::Buy));
        assert!(parse_side("hold").is_err());
    }

    #[test]
    fn cli_parses_trade_command() {
        let cli = Cli::try_parse_from([
            "crypto-pulse",
            "trade",
            "--symbol",
            "btc",
            "--side",
            "sell",
            "--amount",
            "0.25",
            "--price",
            "65000",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Trade {
                side, amount, price, ..
            }) => {
                assert_eq!(side, OrderSide::Sell);
                assert_eq!(amount, 0.25);
                assert_eq!(price, Some(65_000.0));
            }
            _ => panic!("expected trade command"),
        }
    }

    #[test]
    fn cli_defaults_to_watch() {
        let cli = Cli::try_parse_from(["crypto-pulse"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, "config.toml");
    }
}
