use crate::notifier::Notifier;
use crate::tracker::SymbolReport;
use crate::trend::MarketTrend;

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn report(&self, report: &SymbolReport) {
        let ind = &report.indicators;
        tracing::info!(
            symbol = %report.symbol,
            price = report.price,
            change_pct = report.change.percent,
            direction = %report.change.direction,
            window_change_pct = report.window_change.percent,
            window_direction = %report.window_change.direction,
            volume_24h = ?report.volume_24h,
            samples = report.sample_count,
            oldest_price = ?report.oldest_price,
            rsi = ind.rsi,
            macd = ind.macd.macd,
            macd_signal = ind.macd.signal,
            macd_histogram = ind.macd.histogram,
            sma20 = ind.moving_averages.sma20,
            ema20 = ind.moving_averages.ema20,
            sma50 = ind.moving_averages.sma50,
            ema50 = ind.moving_averages.ema50,
            bb_upper = ind.bollinger.upper,
            bb_middle = ind.bollinger.middle,
            bb_lower = ind.bollinger.lower,
            "price update"
        );

        for signal in &report.signals {
            tracing::warn!(
                symbol = %report.symbol,
                kind = %signal.kind,
                source = %signal.source,
                strength = %signal.strength,
                price = report.price,
                "SIGNAL: {}",
                signal.description,
            );
        }
    }

    fn report_trend(&self, trend: &MarketTrend) {
        tracing::info!(
            sentiment = %trend.sentiment,
            average_change_pct = trend.average_change_pct,
            gainers = trend.gainers,
            losers = trend.losers,
            neutral = trend.neutral,
            "{}",
            trend.sentiment.summary(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ticker;
    use crate::tracker::Tracker;

    #[test]
    fn terminal_notifier_does_not_panic() {
        let notifier = TerminalNotifier;
        let mut tracker = Tracker::default();
        let ticker = Ticker {
            symbol: "BTC".into(),
            price: 64_000.0,
            change_24h_pct: Some(-2.5),
            volume_24h: None,
            timestamp_ms: 0,
        };
        let report = tracker.ingest(&ticker).unwrap();
        // Should not panic
        notifier.report(&report);
        notifier.report_trend(&MarketTrend::from_tickers(&[ticker]));
    }
}
