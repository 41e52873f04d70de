use async_trait::async_trait;

use crate::error::TradingError;
use crate::models::order::{OrderId, OrderRequest, OrderResult};

/// The `OrderSubmitter` trait is the only boundary between order logic and a brokerage.
/// Connection setup, authentication and retries belong to the implementor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit a new order to the exchange
    async fn create_order(&mut self, request: OrderRequest) -> Result<OrderResult, TradingError>;

    /// Cancel an existing order
    async fn cancel_order(&mut self, symbol: &str, order_id: &OrderId) -> Result<(), TradingError>;
}
