//! OCO 관련 테스트
//!
//! 가격 순서 검증과 보상 취소 확인

use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::RwLock;
use xOrder::core::OcoSimulator;
use xOrder::exchange::MockExchange;
use xOrder::{OrderId, OrderSide, OrderType};

#[tokio::test]
async fn test_oco_sell_position() {
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let oco = OcoSimulator::new(exchange.clone());

  // 숏 포지션: 익절가 < 손절가
  let orders = oco.place("BTCUSDT", OrderSide::Sell, dec!(0.2), dec!(58000), dec!(66000)).await.unwrap();
  assert_eq!(orders.take_profit.side, OrderSide::Buy);
  assert_eq!(orders.stop_loss.side, OrderSide::Buy);

  let ex = exchange.read().await;
  let types: Vec<OrderType> = ex.submitted().iter().map(|r| r.order_type).collect();
  assert_eq!(types, vec![OrderType::TakeProfitMarket, OrderType::StopMarket]);
}

#[tokio::test]
async fn test_oco_invalid_ordering_never_submits() {
  let exchange = Arc::new(RwLock::new(MockExchange::new()));
  let oco = OcoSimulator::new(exchange.clone());

  let err = oco.place("BTCUSDT", OrderSide::Buy, dec!(1), dec!(50000), dec!(55000)).await.unwrap_err();
  assert!(err.is_validation());
  assert_eq!(exchange.read().await.call_count(), 0);
}

#[tokio::test]
async fn test_oco_rollback_on_second_failure() {
  let exchange = Arc::new(RwLock::new(MockExchange::new().fail_on_call(2)));
  let oco = OcoSimulator::new(exchange.clone());

  assert!(oco.place("BTCUSDT", OrderSide::Buy, dec!(1), dec!(70000), dec!(60000)).await.is_err());

  let ex = exchange.read().await;
  assert_eq!(ex.cancelled(), &[("BTCUSDT".to_string(), OrderId("mock-1".to_string()))]);
}
