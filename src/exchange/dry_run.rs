use async_trait::async_trait;

use crate::error::TradingError;
use crate::exchange::traits::OrderSubmitter;
use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderType};
use crate::utils::current_timestamp_ms;

/// A no-op exchange connector that logs orders without sending them
#[derive(Default)]
pub struct DryRunExchange {
  counter: u64,
}

impl DryRunExchange {
  pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl OrderSubmitter for DryRunExchange {
  async fn create_order(&mut self, request: OrderRequest) -> Result<OrderResult, TradingError> {
    self.counter += 1;
    let id = OrderId(format!("dry-{}-{}-{}", request.symbol, current_timestamp_ms(), self.counter));
    log::info!("[dry-run] {} {} {} qty={:?} price={:?} stop={:?} reduce_only={}",
      id, request.side, request.order_type, request.quantity, request.price, request.stop_price, request.reduce_only);

    // 시장가는 즉시 전량 체결된 것으로 간주
    let (status, executed_qty) = match request.order_type {
      OrderType::Market => ("FILLED", request.quantity),
      _ => ("NEW", None),
    };

    Ok(OrderResult {
      order_id: id,
      client_order_id: request.client_order_id,
      symbol: request.symbol,
      side: request.side,
      order_type: request.order_type,
      status: status.to_string(),
      orig_qty: request.quantity,
      executed_qty,
      avg_price: None,
    })
  }

  async fn cancel_order(&mut self, symbol: &str, order_id: &OrderId) -> Result<(), TradingError> {
    log::info!("[dry-run] cancel {} {}", symbol, order_id);
    Ok(())
  }
}
