//! 로깅 유틸리티
//!
//! 로그 초기화 및 주문 로그 헬퍼

use env_logger::{Builder, Target};
use std::env;
use std::fs::OpenOptions;

use crate::config::LoggingConfig;
use crate::error::TradingError;
use crate::models::order::{OrderId, OrderResult};

/// 레벨 또는 env_logger 지시어(`xOrder=debug,reqwest=warn`)로 빌더 생성
fn builder_for(log_level: &str) -> Builder {
  let mut builder = Builder::new();
  builder
    .parse_filters(log_level)
    .format_timestamp_millis();
  builder
}

/// 로깅 시스템 초기화
///
/// RUST_LOG 가 설정되어 있으면 설정 파일의 레벨보다 우선한다.
/// `file_path` 가 있으면 stderr 대신 해당 파일에 추가 기록한다.
pub fn init(config: &LoggingConfig) -> Result<(), TradingError> {
  let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
  let mut builder = builder_for(&log_level);

  if let Some(path) = &config.file_path {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    builder.target(Target::Pipe(Box::new(file)));
  }

  builder
    .try_init()
    .map_err(|e| TradingError::Config(format!("logger already initialised: {}", e)))?;

  log::info!("로깅 시스템 초기화 완료: 레벨 = {}", log_level);

  Ok(())
}

/// 주문 제출 로그
pub fn log_order_submitted(result: &OrderResult) {
  log::info!("주문 제출: {}", result);
}

/// 주문 취소 로그
pub fn log_order_cancelled(order_id: &OrderId) {
  log::info!("주문 취소: {}", order_id);
}

/// 오류 로그
pub fn log_error(context: &str, error: &TradingError) {
  log::error!("오류 발생 - {}: {}", context, error);
}
