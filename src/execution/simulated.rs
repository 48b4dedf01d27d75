use std::time::Duration;

use chrono::Utc;
use error_stack::Report;
use futures::future::BoxFuture;
use tracing::info;

use crate::error::ExecutionError;
use crate::execution::{TradeExecutor, validate_order};
use crate::model::{OrderReceipt, OrderRequest, OrderType};

/// Fills every valid order immediately after a fixed delay, without touching
/// any exchange.
pub struct SimulatedExecutor {
    latency: Duration,
}

impl SimulatedExecutor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl TradeExecutor for SimulatedExecutor {
    fn name(&self) -> &str {
        "simulated"
    }

    fn execute(
        &self,
        order: OrderRequest,
    ) -> BoxFuture<'_, Result<OrderReceipt, Report<ExecutionError>>> {
        Box::pin(async move {
            validate_order(&order)?;
            tokio::time::sleep(self.latency).await;

            let price = match order.order_type {
                OrderType::Limit { price } => Some(price),
                OrderType::Market => order.reference_price,
            };
            let now = Utc::now();
            let receipt = OrderReceipt {
                id: format!("SIM_{}", now.timestamp_millis()),
                status: "filled".into(),
                symbol: order.symbol,
                side: order.side,
                amount: order.amount,
                price,
                total: price.map(|p| p * order.amount),
                timestamp: now,
                simulated: true,
            };

            info!(
                id = %receipt.id,
                symbol = %receipt.symbol,
                side = %receipt.side,
                amount = receipt.amount,
                price = ?receipt.price,
                "simulated order filled"
            );
            Ok(receipt)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderSide;

    fn order(order_type: OrderType, reference_price: Option<f64>) -> OrderRequest {
        OrderRequest {
            symbol: "BTC".into(),
            side: OrderSide::Buy,
            order_type,
            amount: 0.5,
            reference_price,
        }
    }

    #[tokio::test]
    async fn market_order_fills_at_reference_price() {
        let executor = SimulatedExecutor::new(Duration::ZERO);
        let receipt = executor
            .execute(order(OrderType::Market, Some(60_000.0)))
            .await
            .unwrap();

        assert!(receipt.simulated);
        assert!(receipt.id.starts_with("SIM_"));
        assert_eq!(receipt.status, "filled");
        assert_eq!(receipt.price, Some(60_000.0));
        assert_eq!(receipt.total, Some(30_000.0));
    }

    #[tokio::test]
    async fn limit_order_fills_at_limit_price() {
        let executor = SimulatedExecutor::new(Duration::ZERO);
        let receipt = executor
            .execute(order(OrderType::Limit { price: 100.0 }, Some(60_000.0)))
            .await
            .unwrap();
        assert_eq!(receipt.price, Some(100.0));
        assert_eq!(receipt.total, Some(50.0));
    }

    #[tokio::test]
    async fn market_order_without_reference_has_no_total() {
        let executor = SimulatedExecutor::new(Duration::ZERO);
        let receipt = executor.execute(order(OrderType::Market, None)).await.unwrap();
        assert_eq!(receipt.price, None);
        assert_eq!(receipt.total, None);
    }

    #[tokio::test]
    async fn invalid_order_is_rejected() {
        let executor = SimulatedExecutor::new(Duration::ZERO);
        let mut bad = order(OrderType::Market, None);
        bad.amount = 0.0;
        assert!(executor.execute(bad).await.is_err());
    }

    #[tokio::test]
    async fn fill_waits_for_latency() {
        let executor = SimulatedExecutor::new(Duration::from_millis(20));
        let started = tokio::time::Instant::now();
        executor.execute(order(OrderType::Market, None)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
