/**
* filename : bot
* author : HAMA
* date: 2025. 5. 11.
* description:
**/

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{Config, TwapConfig};
use crate::core::{OcoOrders, OcoSimulator, TwapExecutor};
use crate::error::TradingError;
use crate::exchange::{BinanceFuturesExchange, DryRunExchange, OrderSubmitter};
use crate::models::execution::{ExecutionReport, OrderIntent};
use crate::models::order::{OrderResult, OrderSide};
use crate::order_core::OrderManager;
use crate::utils::logging;

/// 주문 봇 - 주문 유형별 진입점
///
/// 각 주문은 성공/실패를 로그로 남긴 뒤 결과를 그대로 호출자에게 돌려준다.
pub struct TradingBot {
  orders: OrderManager,
  twap: TwapExecutor,
  oco: OcoSimulator,
  twap_defaults: TwapConfig,
}

impl TradingBot {
  pub fn new(exchange: Arc<RwLock<dyn OrderSubmitter>>, twap_defaults: TwapConfig) -> Self {
    TradingBot {
      orders: OrderManager::new(exchange.clone()),
      twap: TwapExecutor::new(exchange.clone()).with_quantity_precision(twap_defaults.quantity_precision),
      oco: OcoSimulator::new(exchange),
      twap_defaults,
    }
  }

  /// 설정에 따라 dry-run 또는 Binance 선물 커넥터로 봇 생성
  pub fn from_config(config: &Config) -> Result<Self, TradingError> {
    let exchange: Arc<RwLock<dyn OrderSubmitter>> = if config.exchange.dry_run {
      log::info!("Dry-run mode: orders will not be sent");
      Arc::new(RwLock::new(DryRunExchange::new()))
    } else {
      let connector = BinanceFuturesExchange::from_config(&config.exchange)?;
      log::info!("Bot initialized on Binance Futures: {}", connector.base_url);
      Arc::new(RwLock::new(connector))
    };
    Ok(Self::new(exchange, config.twap.clone()))
  }

  pub fn twap_defaults(&self) -> &TwapConfig {
    &self.twap_defaults
  }

  pub async fn place_market_order(&self, symbol: &str, side: OrderSide, quantity: Decimal) -> Result<OrderResult, TradingError> {
    let result = self.orders.place_market(symbol, side, quantity).await;
    log_single("Market", &result);
    result
  }

  pub async fn place_limit_order(
    &self,
    symbol: &str,
    side: OrderSide,
    quantity: Decimal,
    price: Decimal,
  ) -> Result<OrderResult, TradingError> {
    let result = self.orders.place_limit(symbol, side, quantity, price).await;
    log_single("Limit", &result);
    result
  }

  pub async fn place_stop_limit_order(
    &self,
    symbol: &str,
    side: OrderSide,
    quantity: Decimal,
    stop_price: Decimal,
    limit_price: Decimal,
  ) -> Result<OrderResult, TradingError> {
    let result = self.orders.place_stop_limit(symbol, side, quantity, stop_price, limit_price).await;
    log_single("Stop-Limit", &result);
    result
  }

  pub async fn place_oco_order(
    &self,
    symbol: &str,
    side: OrderSide,
    quantity: Decimal,
    take_profit_price: Decimal,
    stop_price: Decimal,
  ) -> Result<OcoOrders, TradingError> {
    let result = self.oco.place(symbol, side, quantity, take_profit_price, stop_price).await;
    match &result {
      Ok(orders) => log::info!("OCO simulated orders placed: [{}] [{}]", orders.take_profit, orders.stop_loss),
      Err(e) => logging::log_error("OCO order failed", e),
    }
    result
  }

  /// TWAP 주문. 분할 수/간격이 없으면 설정 기본값 사용
  pub async fn place_twap_order(
    &self,
    symbol: &str,
    side: OrderSide,
    total_quantity: Decimal,
    chunks: Option<u32>,
    interval_seconds: Option<f64>,
  ) -> Result<ExecutionReport, TradingError> {
    let intent = OrderIntent::new(
      symbol,
      side,
      total_quantity,
      chunks.unwrap_or(self.twap_defaults.default_chunks),
      interval_seconds.unwrap_or(self.twap_defaults.default_interval_secs),
    );
    let result = self.twap.execute(&intent).await;
    match &result {
      Ok(report) => log::info!("TWAP order placed: {}", report.summary()),
      Err(e) if e.is_validation() => logging::log_error("TWAP order failed", e),
      // 분할 단위 오류는 실행기가 이미 error 로 남김
      Err(e) => match e.partial_report() {
        Some(report) => log::warn!("TWAP order failed: {}", report.summary()),
        None => log::warn!("TWAP order failed: no chunks submitted"),
      },
    }
    result
  }
}

fn log_single(kind: &str, result: &Result<OrderResult, TradingError>) {
  match result {
    Ok(order) => log::info!("{} order placed: {}", kind, order),
    Err(e) => logging::log_error(&format!("{} order failed", kind), e),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exchange::MockExchange;
  use rust_decimal_macros::dec;

  use log::{Level, LevelFilter, Log, Metadata, Record};
  use std::sync::{Mutex, Once};
  use std::thread::{self, ThreadId};

  static RECORDS: Mutex<Vec<(ThreadId, Level, String)>> = Mutex::new(Vec::new());

  struct CaptureLogger;

  impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
      true
    }

    fn log(&self, record: &Record) {
      if let Ok(mut records) = RECORDS.lock() {
        records.push((thread::current().id(), record.level(), record.args().to_string()));
      }
    }

    fn flush(&self) {}
  }

  static LOGGER: CaptureLogger = CaptureLogger;
  static INIT: Once = Once::new();

  fn capture_logs() {
    INIT.call_once(|| {
      log::set_logger(&LOGGER).ok();
      log::set_max_level(LevelFilter::Trace);
    });
  }

  /// 현재 스레드에서 남긴 error 레벨 로그
  fn error_logs() -> Vec<String> {
    let me = thread::current().id();
    RECORDS
      .lock()
      .unwrap()
      .iter()
      .filter(|(id, level, _)| *id == me && *level == Level::Error)
      .map(|(_, _, msg)| msg.clone())
      .collect()
  }

  fn bot(exchange: Arc<RwLock<MockExchange>>) -> TradingBot {
    TradingBot::new(exchange, Config::default().twap)
  }

  #[tokio::test(start_paused = true)]
  async fn test_twap_uses_configured_defaults() {
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let report = bot(exchange.clone())
      .place_twap_order("BTCUSDT", OrderSide::Buy, dec!(1), None, None)
      .await
      .unwrap();

    assert_eq!(report.child_orders.len(), 5);
    let times = exchange.read().await.submission_times();
    assert_eq!(times[4] - times[0], tokio::time::Duration::from_secs(40));
  }

  #[tokio::test]
  async fn test_errors_are_returned_not_swallowed() {
    let exchange = Arc::new(RwLock::new(MockExchange::new().fail_on_call(1)));
    let bot = bot(exchange);

    assert!(bot.place_market_order("BTCUSDT", OrderSide::Buy, dec!(1)).await.is_err());
    assert!(bot.place_limit_order("BTCUSDT", OrderSide::Buy, dec!(1), dec!(-5)).await.unwrap_err().is_validation());
  }

  #[tokio::test]
  async fn test_twap_failure_is_logged_as_error_once() {
    capture_logs();
    let exchange = Arc::new(RwLock::new(MockExchange::new().fail_on_call(2)));
    let before = error_logs().len();

    let err = bot(exchange)
      .place_twap_order("BTCUSDT", OrderSide::Buy, dec!(3), Some(3), Some(0.0))
      .await
      .unwrap_err();

    assert!(err.partial_report().is_some());
    let errors = error_logs();
    assert_eq!(errors.len() - before, 1);
    assert!(errors[errors.len() - 1].contains("TWAP chunk 2/3"));
  }

  #[tokio::test]
  async fn test_twap_validation_failure_is_logged_by_facade() {
    capture_logs();
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let before = error_logs().len();

    let err = bot(exchange)
      .place_twap_order("BTCUSDT", OrderSide::Buy, dec!(3), Some(0), Some(0.0))
      .await
      .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(error_logs().len() - before, 1);
  }

  #[test]
  fn test_from_config_dry_run_needs_no_credentials() {
    let mut config = Config::default();
    config.exchange.dry_run = true;
    assert!(TradingBot::from_config(&config).is_ok());

    config.exchange.dry_run = false;
    assert!(TradingBot::from_config(&config).is_err());
  }
}
