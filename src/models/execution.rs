use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::order::{OrderResult, OrderSide};

/// TWAP 주문 의도 - 실행 시작 후 변경되지 않음
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub total_quantity: Decimal,
    pub chunk_count: u32,
    pub interval_seconds: f64,
}

impl OrderIntent {
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        total_quantity: Decimal,
        chunk_count: u32,
        interval_seconds: f64,
    ) -> Self {
        OrderIntent {
            symbol: symbol.into(),
            side,
            total_quantity,
            chunk_count,
            interval_seconds,
        }
    }
}

/// 분할 주문 제출 결과
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SubmissionOutcome {
    Submitted(OrderResult),
    Failed(String),
}

/// 분할 주문 1건
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildOrder {
    pub sequence_index: usize,
    pub requested_quantity: Decimal,
    pub submission_result: SubmissionOutcome,
}

impl ChildOrder {
    pub fn is_submitted(&self) -> bool {
        matches!(self.submission_result, SubmissionOutcome::Submitted(_))
    }

    /// 거래소가 보고한 체결 수량. 보고가 없거나 실패한 주문은 0
    pub fn executed_quantity(&self) -> Decimal {
        match &self.submission_result {
            SubmissionOutcome::Submitted(result) => result.executed_qty.unwrap_or(Decimal::ZERO),
            SubmissionOutcome::Failed(_) => Decimal::ZERO,
        }
    }

    pub fn order(&self) -> Option<&OrderResult> {
        match &self.submission_result {
            SubmissionOutcome::Submitted(result) => Some(result),
            SubmissionOutcome::Failed(_) => None,
        }
    }
}

/// TWAP 실행 보고서
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionReport {
    pub child_orders: Vec<ChildOrder>,
    pub total_requested: Decimal,
    pub total_executed: Decimal,
}

impl ExecutionReport {
    pub fn new(child_orders: Vec<ChildOrder>, total_requested: Decimal) -> Self {
        let total_executed = child_orders.iter().map(ChildOrder::executed_quantity).sum();
        ExecutionReport {
            child_orders,
            total_requested,
            total_executed,
        }
    }

    pub fn successful_count(&self) -> usize {
        self.child_orders.iter().filter(|c| c.is_submitted()).count()
    }

    /// 제출에 성공한 분할 주문의 요청 수량 합계
    pub fn submitted_quantity(&self) -> Decimal {
        self.child_orders
            .iter()
            .filter(|c| c.is_submitted())
            .map(|c| c.requested_quantity)
            .sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} / {} chunks submitted, requested {}, executed {}",
            self.successful_count(),
            self.child_orders.len(),
            self.total_requested,
            self.total_executed
        )
    }
}
