pub mod remote;
pub mod simulated;

use std::time::Duration;

use error_stack::{Report, bail};
use futures::future::BoxFuture;

use crate::config::ExecutionConfig;
use crate::error::ExecutionError;
use crate::model::{OrderReceipt, OrderRequest, OrderType};
use remote::RemoteExecutor;
use simulated::SimulatedExecutor;

/// Places orders. Which implementation runs is decided once, from
/// configuration; a failing remote order never falls back to simulation.
pub trait TradeExecutor: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, order: OrderRequest)
    -> BoxFuture<'_, Result<OrderReceipt, Report<ExecutionError>>>;
}

pub fn build_executor(
    config: &ExecutionConfig,
) -> Result<Box<dyn TradeExecutor>, Report<ExecutionError>> {
    match config.mode.as_str() {
        "remote" => Ok(Box::new(RemoteExecutor::new(config)?)),
        "simulated" => Ok(Box::new(SimulatedExecutor::new(Duration::from_millis(
            config.simulated_latency_ms,
        )))),
        other => bail!(ExecutionError::InvalidOrder {
            reason: format!("unknown execution mode \"{other}\""),
        }),
    }
}

/// Reject orders no venue would accept.
pub fn validate_order(order: &OrderRequest) -> Result<(), Report<ExecutionError>> {
    if order.symbol.trim().is_empty() {
        bail!(ExecutionError::InvalidOrder {
            reason: "symbol must not be empty".into(),
        });
    }
    if !order.amount.is_finite() || order.amount <= 0.0 {
        bail!(ExecutionError::InvalidOrder {
            reason: format!("amount must be > 0, got {}", order.amount),
        });
    }
    if let OrderType::Limit { price } = order.order_type {
        if !price.is_finite() || price <= 0.0 {
            bail!(ExecutionError::InvalidOrder {
                reason: format!("limit price must be > 0, got {price}"),
            });
        }
    }
    Ok(())
}
