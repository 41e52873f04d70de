/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use thiserror::Error;

use crate::models::execution::ExecutionReport;

#[derive(Error, Debug)]
pub enum TradingError {
    /// 입력값 오류 - 네트워크 호출 전에 발생
    #[error("Validation error: {0}")]
    Validation(String),

    /// 거래소 호출 실패
    #[error("Submission error: {0}")]
    Submission(String),

    /// TWAP 일부 분할 주문 체결 후 실패
    #[error("Partial execution: {} of {} chunks submitted before failure: {}", .report.successful_count(), .report.child_orders.len(), .source)]
    PartialExecution {
        report: Box<ExecutionReport>,
        #[source]
        source: Box<TradingError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl TradingError {
    /// 네트워크 호출 전 검증 단계에서 거부된 오류인지 여부
    pub fn is_validation(&self) -> bool {
        matches!(self, TradingError::Validation(_))
    }

    /// 부분 실행 보고서 (있을 경우)
    pub fn partial_report(&self) -> Option<&ExecutionReport> {
        match self {
            TradingError::PartialExecution { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}

impl From<::config::ConfigError> for TradingError {
    fn from(e: ::config::ConfigError) -> Self {
        TradingError::Config(e.to_string())
    }
}
