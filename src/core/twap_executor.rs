/**
* filename : twap_executor
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::TradingError;
use crate::exchange::traits::OrderSubmitter;
use crate::models::execution::{ChildOrder, ExecutionReport, OrderIntent, SubmissionOutcome};
use crate::models::order::OrderRequest;
use crate::order_core::validator;
use crate::utils::logging;

/// 기본 수량 소수점 자리수
pub const DEFAULT_QUANTITY_PRECISION: u32 = 8;

/// 분할 계획 - 분할 수량을 인덱스별로 계산한다 (목록을 미리 만들지 않음)
///
/// 앞의 `chunks - 1` 개는 `total / chunks` 를 `precision` 자리에서 버림한 값,
/// 마지막 분할은 나머지 전부. 합계는 항상 `total` 과 정확히 같다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkPlan {
  total: Decimal,
  chunks: u32,
  base: Decimal,
}

impl ChunkPlan {
  pub fn new(total: Decimal, chunks: u32, precision: u32) -> Self {
    let base = if chunks == 0 {
      Decimal::ZERO
    } else {
      (total / Decimal::from(chunks)).round_dp_with_strategy(precision, RoundingStrategy::ToZero)
    };
    ChunkPlan { total, chunks, base }
  }

  /// 마지막을 제외한 분할 수량
  pub fn base(&self) -> Decimal {
    self.base
  }

  /// `index` 번째 분할 수량 (범위 밖이면 None)
  pub fn size(&self, index: u32) -> Option<Decimal> {
    if index >= self.chunks {
      return None;
    }
    if index + 1 < self.chunks {
      Some(self.base)
    } else {
      Some(self.total - self.base * Decimal::from(self.chunks - 1))
    }
  }

  pub fn sizes(&self) -> impl Iterator<Item = Decimal> + '_ {
    (0..self.chunks).filter_map(move |i| self.size(i))
  }
}

/// TWAP 실행기 - 시장가 분할 주문을 고정 간격으로 순차 제출
pub struct TwapExecutor {
  /// 거래소 인스턴스
  exchange: Arc<RwLock<dyn OrderSubmitter>>,
  /// 분할 수량 소수점 자리수
  quantity_precision: u32,
}

impl TwapExecutor {
  /// 새 TWAP 실행기 생성
  pub fn new(exchange: Arc<RwLock<dyn OrderSubmitter>>) -> Self {
    TwapExecutor {
      exchange,
      quantity_precision: DEFAULT_QUANTITY_PRECISION,
    }
  }

  pub fn with_quantity_precision(mut self, precision: u32) -> Self {
    self.quantity_precision = precision;
    self
  }

  /// TWAP 실행
  ///
  /// 분할 주문 제출이 실패하면 남은 분할은 중단된다. 이미 제출된 분할이 있으면
  /// `PartialExecution` 에 부분 보고서를 담아 반환하고, 없으면 원래 오류를 그대로 반환한다.
  pub async fn execute(&self, intent: &OrderIntent) -> Result<ExecutionReport, TradingError> {
    let symbol = validator::normalize_symbol(&intent.symbol)?;
    let total = validator::require_positive("Total quantity", intent.total_quantity)?;
    let chunk_count = validator::validate_chunk_count(intent.chunk_count)?;
    let pause = validator::validate_interval(intent.interval_seconds)?;

    let run_id = Uuid::new_v4().simple().to_string()[..8].to_string();
    let plan = ChunkPlan::new(total, chunk_count, self.quantity_precision);
    let last_index = chunk_count - 1;

    log::info!("TWAP 시작: {} {} {} - {}개 분할, 간격 {:?} (run {})",
      symbol, intent.side, total, chunk_count, pause, run_id);

    // 기본 분할이 정밀도 아래로 버려지면 마지막 분할만 남는다
    let first_index = if plan.base().is_zero() && last_index > 0 {
      log::warn!("TWAP chunks 1-{} of {} skipped: size 0 at precision {}",
        last_index, chunk_count, self.quantity_precision);
      last_index
    } else {
      0
    };

    let mut child_orders = Vec::new();

    for i in first_index..chunk_count {
      let quantity = match plan.size(i) {
        Some(q) if q > Decimal::ZERO => q,
        _ => {
          log::warn!("TWAP chunk {}/{} skipped: size 0", i + 1, chunk_count);
          continue;
        }
      };
      let i = i as usize;

      let request = OrderRequest::market(symbol.clone(), intent.side, quantity)
        .with_client_order_id(format!("twap-{}-{}", run_id, i));

      let result = {
        let mut exchange = self.exchange.write().await;
        exchange.create_order(request).await
      };

      match result {
        Ok(order) => {
          log::info!("TWAP chunk {}/{} executed: {}", i + 1, chunk_count, order);
          child_orders.push(ChildOrder {
            sequence_index: i,
            requested_quantity: quantity,
            submission_result: SubmissionOutcome::Submitted(order),
          });
        }
        Err(e) => {
          logging::log_error(&format!("TWAP chunk {}/{}", i + 1, chunk_count), &e);
          child_orders.push(ChildOrder {
            sequence_index: i,
            requested_quantity: quantity,
            submission_result: SubmissionOutcome::Failed(e.to_string()),
          });

          let report = ExecutionReport::new(child_orders, total);
          if report.successful_count() == 0 {
            return Err(e);
          }
          return Err(TradingError::PartialExecution {
            report: Box::new(report),
            source: Box::new(e),
          });
        }
      }

      if i < last_index as usize && !pause.is_zero() {
        tokio::time::sleep(pause).await;
      }
    }

    let report = ExecutionReport::new(child_orders, total);
    log::info!("TWAP 완료: {} ({})", symbol, report.summary());
    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::exchange::traits::MockOrderSubmitter;
  use crate::exchange::MockExchange;
  use crate::models::order::{OrderSide, OrderType};
  use rstest::rstest;
  use rust_decimal_macros::dec;
  use tokio::time::{Duration, Instant};

  fn executor(exchange: Arc<RwLock<MockExchange>>) -> TwapExecutor {
    TwapExecutor::new(exchange)
  }

  #[rstest]
  #[case(dec!(10), 3)]
  #[case(dec!(1), 7)]
  #[case(dec!(0.3), 3)]
  #[case(dec!(123.456789), 11)]
  #[case(dec!(0.001), 9)]
  #[case(dec!(5), 1)]
  fn test_split_sums_exactly(#[case] total: Decimal, #[case] chunks: u32) {
    let sizes: Vec<Decimal> = ChunkPlan::new(total, chunks, DEFAULT_QUANTITY_PRECISION).sizes().collect();
    assert_eq!(sizes.len(), chunks as usize);
    assert_eq!(sizes.iter().copied().sum::<Decimal>(), total);
    assert!(sizes.iter().all(|s| *s >= Decimal::ZERO));
  }

  #[test]
  fn test_split_sum_holds_for_many_counts() {
    for chunks in 1..=64u32 {
      for total in [dec!(1), dec!(10), dec!(0.7), dec!(99.99999999), dec!(12345.6789)] {
        let sum: Decimal = ChunkPlan::new(total, chunks, DEFAULT_QUANTITY_PRECISION).sizes().sum();
        assert_eq!(sum, total, "total {} chunks {}", total, chunks);
      }
    }
  }

  #[test]
  fn test_split_remainder_goes_to_last_chunk() {
    let sizes: Vec<Decimal> = ChunkPlan::new(dec!(10), 3, DEFAULT_QUANTITY_PRECISION).sizes().collect();
    assert_eq!(sizes, vec![dec!(3.33333333), dec!(3.33333333), dec!(3.33333334)]);
  }

  #[test]
  fn test_plan_sizes_by_index_without_materialising() {
    let plan = ChunkPlan::new(dec!(1), u32::MAX, DEFAULT_QUANTITY_PRECISION);
    assert_eq!(plan.base(), Decimal::ZERO);
    assert_eq!(plan.size(0), Some(Decimal::ZERO));
    assert_eq!(plan.size(u32::MAX - 1), Some(dec!(1)));
    assert_eq!(plan.size(u32::MAX), None);
  }

  #[tokio::test]
  async fn test_execute_splits_into_market_orders() {
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let intent = OrderIntent::new("btcusdt", OrderSide::Buy, dec!(10), 3, 0.0);

    let report = executor(exchange.clone()).execute(&intent).await.unwrap();

    assert_eq!(report.child_orders.len(), 3);
    assert_eq!(report.total_requested, dec!(10));
    assert_eq!(report.total_executed, dec!(10));
    assert_eq!(report.submitted_quantity(), dec!(10));

    let ex = exchange.read().await;
    let sent = ex.submitted();
    assert!(sent.iter().all(|r| r.order_type == OrderType::Market && r.symbol == "BTCUSDT"));
    assert!(sent.iter().all(|r| r.client_order_id.as_deref().map(|id| id.starts_with("twap-")).unwrap_or(false)));
  }

  #[tokio::test(start_paused = true)]
  async fn test_pauses_between_chunks_but_not_after_last() {
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Sell, dec!(3), 3, 10.0);

    let started = Instant::now();
    executor(exchange.clone()).execute(&intent).await.unwrap();
    let elapsed = started.elapsed();

    let times = exchange.read().await.submission_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(10));
    assert_eq!(times[2] - times[1], Duration::from_secs(10));
    assert!(elapsed < Duration::from_secs(21));
  }

  #[tokio::test(start_paused = true)]
  async fn test_single_chunk_has_no_pause() {
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, dec!(2.5), 1, 30.0);

    let started = Instant::now();
    let report = executor(exchange.clone()).execute(&intent).await.unwrap();

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(report.child_orders.len(), 1);
    assert_eq!(report.child_orders[0].requested_quantity, dec!(2.5));
  }

  #[rstest]
  #[case(2)]
  #[case(3)]
  #[case(5)]
  #[tokio::test]
  async fn test_failure_on_chunk_k_keeps_prior_chunks(#[case] k: usize) {
    let exchange = Arc::new(RwLock::new(MockExchange::new().fail_on_call(k)));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, dec!(5), 5, 0.0);

    let err = executor(exchange.clone()).execute(&intent).await.unwrap_err();
    let report = err.partial_report().expect("partial report");

    assert_eq!(report.successful_count(), k - 1);
    assert_eq!(report.child_orders.len(), k);
    assert!(!report.child_orders[k - 1].is_submitted());
    assert_eq!(report.total_executed, Decimal::from(k as u64 - 1));
    assert_eq!(exchange.read().await.call_count(), k);
  }

  #[tokio::test]
  async fn test_failure_on_first_chunk_is_plain_submission_error() {
    let exchange = Arc::new(RwLock::new(MockExchange::new().fail_on_call(1)));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, dec!(5), 5, 0.0);

    let err = executor(exchange.clone()).execute(&intent).await.unwrap_err();
    assert!(matches!(err, TradingError::Submission(_)));
    assert_eq!(exchange.read().await.call_count(), 1);
  }

  #[tokio::test]
  async fn test_missing_fill_amount_counts_as_zero() {
    let exchange = Arc::new(RwLock::new(MockExchange::new().without_fill_reports()));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, dec!(1), 4, 0.0);

    let report = executor(exchange).execute(&intent).await.unwrap();
    assert_eq!(report.successful_count(), 4);
    assert_eq!(report.total_executed, Decimal::ZERO);
  }

  #[tokio::test]
  async fn test_zero_sized_chunks_are_skipped() {
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, dec!(0.00000002), 3, 0.0);

    let report = executor(exchange.clone()).execute(&intent).await.unwrap();
    assert_eq!(report.child_orders.len(), 1);
    assert_eq!(report.child_orders[0].sequence_index, 2);
    assert_eq!(report.child_orders[0].requested_quantity, dec!(0.00000002));
    assert_eq!(exchange.read().await.call_count(), 1);
  }

  #[tokio::test]
  async fn test_huge_chunk_count_submits_only_the_remainder() {
    let exchange = Arc::new(RwLock::new(MockExchange::new()));
    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, dec!(1), 200_000_000, 0.0);

    let report = executor(exchange.clone()).execute(&intent).await.unwrap();

    assert_eq!(report.child_orders.len(), 1);
    assert_eq!(report.child_orders[0].sequence_index, 199_999_999);
    assert_eq!(report.child_orders[0].requested_quantity, dec!(1));
    assert_eq!(exchange.read().await.call_count(), 1);
  }

  #[rstest]
  #[case(dec!(0), 3, 0.0)]
  #[case(dec!(-1), 3, 0.0)]
  #[case(dec!(1), 0, 0.0)]
  #[case(dec!(1), 3, -0.5)]
  #[tokio::test]
  async fn test_invalid_intent_never_submits(#[case] total: Decimal, #[case] chunks: u32, #[case] interval: f64) {
    let mut mock = MockOrderSubmitter::new();
    mock.expect_create_order().never();
    let twap = TwapExecutor::new(Arc::new(RwLock::new(mock)));

    let intent = OrderIntent::new("BTCUSDT", OrderSide::Buy, total, chunks, interval);
    let err = twap.execute(&intent).await.unwrap_err();
    assert!(err.is_validation());
  }
}
