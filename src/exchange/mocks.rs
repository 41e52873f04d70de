use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::TradingError;
use crate::exchange::traits::OrderSubmitter;
use crate::models::order::{OrderId, OrderRequest, OrderResult, OrderType};

/// A scripted, recording implementation of `OrderSubmitter` for tests and demos
pub struct MockExchange {
    submitted: Vec<(Instant, OrderRequest)>,
    cancelled: Vec<(String, OrderId)>,
    fail_on_call: Option<usize>,
    fail_cancels: bool,
    report_fills: bool,
    order_id_counter: u64,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    pub fn new() -> Self {
        MockExchange {
            submitted: Vec::new(),
            cancelled: Vec::new(),
            fail_on_call: None,
            fail_cancels: false,
            report_fills: true,
            order_id_counter: 0,
        }
    }

    /// The n-th `create_order` call (1-based) is rejected
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn fail_cancels(mut self) -> Self {
        self.fail_cancels = true;
        self
    }

    /// Results carry no `executed_qty`
    pub fn without_fill_reports(mut self) -> Self {
        self.report_fills = false;
        self
    }

    /// Number of `create_order` calls, including rejected ones
    pub fn call_count(&self) -> usize {
        self.submitted.len()
    }

    pub fn submitted(&self) -> Vec<&OrderRequest> {
        self.submitted.iter().map(|(_, req)| req).collect()
    }

    pub fn submission_times(&self) -> Vec<Instant> {
        self.submitted.iter().map(|(at, _)| *at).collect()
    }

    pub fn cancelled(&self) -> &[(String, OrderId)] {
        &self.cancelled
    }

    fn generate_order_id(&mut self) -> OrderId {
        self.order_id_counter += 1;
        OrderId(format!("mock-{}", self.order_id_counter))
    }
}

#[async_trait]
impl OrderSubmitter for MockExchange {
    async fn create_order(&mut self, request: OrderRequest) -> Result<OrderResult, TradingError> {
        self.submitted.push((Instant::now(), request.clone()));

        if self.fail_on_call == Some(self.submitted.len()) {
            return Err(TradingError::Submission(format!(
                "mock rejection on call {}",
                self.submitted.len()
            )));
        }

        let order_id = self.generate_order_id();
        let filled = request.order_type == OrderType::Market;
        let executed_qty = match (filled, self.report_fills) {
            (true, true) => request.quantity,
            _ => None,
        };

        Ok(OrderResult {
            order_id,
            client_order_id: request.client_order_id,
            symbol: request.symbol,
            side: request.side,
            order_type: request.order_type,
            status: if filled { "FILLED" } else { "NEW" }.to_string(),
            orig_qty: request.quantity,
            executed_qty,
            avg_price: None,
        })
    }

    async fn cancel_order(&mut self, symbol: &str, order_id: &OrderId) -> Result<(), TradingError> {
        self.cancelled.push((symbol.to_string(), order_id.clone()));
        if self.fail_cancels {
            Err(TradingError::Submission(format!("mock cancel rejected for {}", order_id)))
        } else {
            Ok(())
        }
    }
}
