/**
* filename : oco_simulator
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::OrderSubmitter;
use crate::models::order::{OrderRequest, OrderResult, OrderSide, OrderType};
use crate::order_core::validator;
use crate::utils::logging;

/// OCO 로 제출된 익절/손절 주문 한 쌍
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcoOrders {
  pub take_profit: OrderResult,
  pub stop_loss: OrderResult,
}

/// OCO 시뮬레이터
///
/// 선물 API 에는 OCO 가 없으므로 반대 방향의 reduce-only `TAKE_PROFIT_MARKET` 과
/// `STOP_MARKET` 을 차례로 제출한다. 두 번째 주문이 실패하면 첫 번째 주문을
/// 한 번 취소 시도한 뒤 원래 오류를 반환한다.
pub struct OcoSimulator {
  /// 거래소 인스턴스
  exchange: Arc<RwLock<dyn OrderSubmitter>>,
}

impl OcoSimulator {
  pub fn new(exchange: Arc<RwLock<dyn OrderSubmitter>>) -> Self {
    OcoSimulator { exchange }
  }

  /// `side` 는 보호할 포지션의 진입 방향
  pub async fn place(
    &self,
    symbol: &str,
    side: OrderSide,
    quantity: Decimal,
    take_profit_price: Decimal,
    stop_price: Decimal,
  ) -> Result<OcoOrders, TradingError> {
    let symbol = validator::normalize_symbol(symbol)?;
    let quantity = validator::require_positive("Quantity", quantity)?;
    validator::validate_oco_prices(side, take_profit_price, stop_price)?;

    let exit_side = side.opposite();
    let take_profit_request = OrderRequest::new(symbol.clone(), exit_side, OrderType::TakeProfitMarket)
      .with_quantity(quantity)
      .with_stop_price(take_profit_price)
      .reduce_only();
    let stop_request = OrderRequest::new(symbol.clone(), exit_side, OrderType::StopMarket)
      .with_quantity(quantity)
      .with_stop_price(stop_price)
      .reduce_only();

    let mut exchange = self.exchange.write().await;

    let take_profit = exchange.create_order(take_profit_request).await?;
    logging::log_order_submitted(&take_profit);

    let stop_loss = match exchange.create_order(stop_request).await {
      Ok(order) => order,
      Err(e) => {
        logging::log_error("OCO stop order", &e);
        // 보상 취소: 실패해도 재시도하지 않고 원래 오류를 반환
        match exchange.cancel_order(&symbol, &take_profit.order_id).await {
          Ok(()) => logging::log_order_cancelled(&take_profit.order_id),
          Err(cancel_err) => log::warn!(
            "OCO rollback: failed to cancel take profit order {}: {}",
            take_profit.order_id, cancel_err
          ),
        }
        return Err(e);
      }
    };
    logging::log_order_submitted(&stop_loss);

    Ok(OcoOrders { take_profit, stop_loss })
  }
}
