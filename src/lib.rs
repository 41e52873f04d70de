//! 선물 주문 봇 라이브러리
//!
//! 시장가/지정가/스탑 리밋 주문과 TWAP, OCO(시뮬레이션) 실행을 지원합니다.

pub mod bot;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod models;
pub mod order_core;
pub mod utils;

// 핵심 타입 재노출
pub use crate::bot::TradingBot;
pub use crate::error::TradingError;
pub use crate::exchange::traits::OrderSubmitter;
pub use crate::models::execution::{ChildOrder, ExecutionReport, OrderIntent, SubmissionOutcome};
pub use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderSide, OrderType, TimeInForce};

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TradingError>;
