pub mod coindesk;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::FeedError;
use crate::model::Ticker;

/// Source of the latest quotes for the tracked instruments.
///
/// Uses `BoxFuture` so the trait stays object-safe (`dyn PriceFeed`). The
/// feed only answers when asked; polling cadence belongs to the caller.
pub trait PriceFeed: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<Ticker>, Report<FeedError>>>;
}
