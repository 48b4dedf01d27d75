pub mod terminal;

use crate::tracker::SymbolReport;
use crate::trend::MarketTrend;

/// Sink for per-symbol reports and market summaries.
pub trait Notifier: Send + Sync {
    fn report(&self, report: &SymbolReport);

    fn report_trend(&self, trend: &MarketTrend);
}
