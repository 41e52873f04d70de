use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::OrderSubmitter;
use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderSide, OrderType, TimeInForce};
use crate::order_core::validator::{self, BasicOrderValidator, OrderValidator};
use crate::utils::logging;

/// 주문 관리자 - 단일 주문 검증 및 제출
pub struct OrderManager {
    exchange: Arc<RwLock<dyn OrderSubmitter>>,
    validator: BasicOrderValidator,
}

impl OrderManager {
    pub fn new(exchange: Arc<RwLock<dyn OrderSubmitter>>) -> Self {
        OrderManager {
            exchange,
            validator: BasicOrderValidator,
        }
    }

    /// 검증 후 주문 제출. 검증 실패 시 거래소 호출 없음
    pub async fn submit(&self, request: OrderRequest) -> Result<OrderResult, TradingError> {
        self.validator.validate(&request)?;

        let mut exchange = self.exchange.write().await;
        exchange.create_order(request).await
    }

    /// 주문 취소
    pub async fn cancel(&self, symbol: &str, order_id: &OrderId) -> Result<(), TradingError> {
        let mut exchange = self.exchange.write().await;
        exchange.cancel_order(symbol, order_id).await?;
        logging::log_order_cancelled(order_id);
        Ok(())
    }

    /// 시장가 주문
    pub async fn place_market(&self, symbol: &str, side: OrderSide, quantity: Decimal) -> Result<OrderResult, TradingError> {
        let symbol = validator::normalize_symbol(symbol)?;
        let quantity = validator::require_positive("Quantity", quantity)?;

        self.submit(OrderRequest::market(symbol, side, quantity)).await
    }

    /// 지정가 주문 (GTC)
    pub async fn place_limit(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderResult, TradingError> {
        let symbol = validator::normalize_symbol(symbol)?;
        let quantity = validator::require_positive("Quantity", quantity)?;
        let price = validator::require_positive("Price", price)?;

        let request = OrderRequest::new(symbol, side, OrderType::Limit)
            .with_quantity(quantity)
            .with_price(price)
            .with_time_in_force(TimeInForce::Gtc);
        self.submit(request).await
    }

    /// 스탑 리밋 주문 - stop_price 도달 시 limit_price 지정가 주문 (GTC)
    pub async fn place_stop_limit(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
        limit_price: Decimal,
    ) -> Result<OrderResult, TradingError> {
        let symbol = validator::normalize_symbol(symbol)?;
        let quantity = validator::require_positive("Quantity", quantity)?;
        let stop_price = validator::require_positive("Stop price", stop_price)?;
        let limit_price = validator::require_positive("Limit price", limit_price)?;

        let request = OrderRequest::new(symbol, side, OrderType::Stop)
            .with_quantity(quantity)
            .with_price(limit_price)
            .with_stop_price(stop_price)
            .with_time_in_force(TimeInForce::Gtc);
        self.submit(request).await
    }
}
