use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt, bail};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::ExecutionConfig;
use crate::error::ExecutionError;
use crate::execution::{TradeExecutor, validate_order};
use crate::model::{OrderReceipt, OrderRequest, OrderSide, OrderType};

const EXECUTOR_NAME: &str = "remote";

/// Places orders on an exchange REST endpoint (`POST {base_url}/orders`).
pub struct RemoteExecutor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteExecutor {
    pub fn new(config: &ExecutionConfig) -> Result<Self, Report<ExecutionError>> {
        let credential = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let (Some(api_key), Some(_secret)) =
            (credential(&config.api_key), credential(&config.api_secret))
        else {
            bail!(ExecutionError::MissingCredentials {
                executor: EXECUTOR_NAME.into(),
            });
        };

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key,
        })
    }
}

impl TradeExecutor for RemoteExecutor {
    fn name(&self) -> &str {
        EXECUTOR_NAME
    }

    fn execute(
        &self,
        order: OrderRequest,
    ) -> BoxFuture<'_, Result<OrderReceipt, Report<ExecutionError>>> {
        Box::pin(async move {
            validate_order(&order)?;

            let client_oid = Uuid::new_v4();
            let body = OrderBody::from_request(&order, client_oid);
            let url = format!("{}/orders", self.base_url);

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .change_context(ExecutionError::Request {
                    executor: EXECUTOR_NAME.into(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Report::new(ExecutionError::Rejected {
                    executor: EXECUTOR_NAME.into(),
                    status: status.as_u16(),
                })
                .attach(format!("client_oid: {client_oid}")));
            }

            let raw: OrderResponse =
                response
                    .json()
                    .await
                    .change_context(ExecutionError::ResponseParse {
                        executor: EXECUTOR_NAME.into(),
                    })?;

            let receipt = raw.into_receipt(&order, client_oid);
            info!(
                id = %receipt.id,
                status = %receipt.status,
                symbol = %receipt.symbol,
                side = %receipt.side,
                amount = receipt.amount,
                "order placed"
            );
            Ok(receipt)
        })
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OrderBody {
    symbol: String,
    product_id: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: &'static str,
    amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    client_oid: String,
}

impl OrderBody {
    fn from_request(order: &OrderRequest, client_oid: Uuid) -> Self {
        let price = match order.order_type {
            OrderType::Limit { price } => Some(price),
            OrderType::Market => None,
        };
        Self {
            symbol: order.product_id(),
            product_id: order.product_id(),
            side: order.side,
            order_type: order.order_type.as_str(),
            amount: order.amount,
            price,
            client_oid: client_oid.to_string(),
        }
    }
}

/// Only the fields needed for a receipt; everything else is ignored.
#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: Option<String>,
    status: Option<String>,
    price: Option<f64>,
    created_at: Option<DateTime<Utc>>,
}

impl OrderResponse {
    fn into_receipt(self, order: &OrderRequest, client_oid: Uuid) -> OrderReceipt {
        let price = self.price.or(match order.order_type {
            OrderType::Limit { price } => Some(price),
            OrderType::Market => None,
        });
        OrderReceipt {
            id: self.id.unwrap_or_else(|| client_oid.to_string()),
            status: self.status.unwrap_or_else(|| "pending".into()),
            symbol: order.symbol.clone(),
            side: order.side,
            amount: order.amount,
            price,
            total: price.map(|p| p * order.amount),
            timestamp: self.created_at.unwrap_or_else(Utc::now),
            simulated: false,
        }
    }
}
