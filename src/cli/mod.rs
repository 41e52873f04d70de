//! 명령줄 주문 처리 - 메뉴 입력 수집과 주문 실행

pub mod prompt;

use rust_decimal::Decimal;
use std::io::{BufRead, Write};

use crate::bot::TradingBot;
use crate::config::TwapConfig;
use crate::error::TradingError;
use crate::models::order::OrderSide;
use crate::order_core::validator;
use prompt::{parse_chunks, parse_interval, Prompter};

/// 실행할 주문 한 건
#[derive(Debug, Clone, PartialEq)]
pub enum OrderCommand {
  Market { symbol: String, side: OrderSide, quantity: Decimal },
  Limit { symbol: String, side: OrderSide, quantity: Decimal, price: Decimal },
  StopLimit { symbol: String, side: OrderSide, quantity: Decimal, stop_price: Decimal, limit_price: Decimal },
  Oco { symbol: String, side: OrderSide, quantity: Decimal, take_profit_price: Decimal, stop_price: Decimal },
  Twap { symbol: String, side: OrderSide, quantity: Decimal, chunks: Option<u32>, interval_seconds: Option<f64> },
}

const MENU: &str = "\nSelect Order Type:\n1. Market Order\n2. Limit Order\n3. Stop-Limit Order\n4. OCO Order\n5. TWAP Order";

/// 메뉴 선택 (1-5)
pub fn parse_menu_choice(input: &str) -> Result<u8, TradingError> {
  match input.trim() {
    "1" => Ok(1),
    "2" => Ok(2),
    "3" => Ok(3),
    "4" => Ok(4),
    "5" => Ok(5),
    other => Err(TradingError::Validation(format!("Invalid choice '{}', expected 1-5", other))),
  }
}

/// 대화형 메뉴로 주문 입력 수집
pub fn collect_menu_order<R: BufRead, W: Write>(
  prompter: &mut Prompter<R, W>,
  twap_defaults: &TwapConfig,
) -> Result<OrderCommand, TradingError> {
  prompter.say(MENU)?;
  let choice = prompter.ask("Choice (1-5)", parse_menu_choice)?;

  let symbol = prompter.ask("Symbol (e.g., BTCUSDT)", validator::normalize_symbol)?;
  let side = prompter.ask("Side (BUY/SELL)", validator::parse_side)?;
  let quantity = prompter.ask("Quantity", |s| validator::parse_positive_decimal("Quantity", s))?;

  let command = match choice {
    1 => OrderCommand::Market { symbol, side, quantity },
    2 => {
      let price = prompter.ask("Price", |s| validator::parse_positive_decimal("Price", s))?;
      OrderCommand::Limit { symbol, side, quantity, price }
    }
    3 => {
      let stop_price = prompter.ask("Stop Price", |s| validator::parse_positive_decimal("Stop price", s))?;
      let limit_price = prompter.ask("Limit Price", |s| validator::parse_positive_decimal("Limit price", s))?;
      OrderCommand::StopLimit { symbol, side, quantity, stop_price, limit_price }
    }
    4 => {
      let take_profit_price = prompter.ask("Take Profit Price", |s| {
        validator::parse_positive_decimal("Take profit price", s)
      })?;
      let stop_price = prompter.ask("Stop Price", |s| {
        let stop = validator::parse_positive_decimal("Stop price", s)?;
        validator::validate_oco_prices(side, take_profit_price, stop)?;
        Ok(stop)
      })?;
      OrderCommand::Oco { symbol, side, quantity, take_profit_price, stop_price }
    }
    _ => {
      let chunks = prompter.ask_or("Number of chunks", twap_defaults.default_chunks, parse_chunks)?;
      let interval = prompter.ask_or(
        "Interval between chunks (seconds)",
        twap_defaults.default_interval_secs,
        parse_interval,
      )?;
      OrderCommand::Twap { symbol, side, quantity, chunks: Some(chunks), interval_seconds: Some(interval) }
    }
  };

  Ok(command)
}

/// 주문 실행 후 결과를 사람이 읽을 수 있는 줄 목록으로 반환
pub async fn execute(bot: &TradingBot, command: OrderCommand) -> Result<Vec<String>, TradingError> {
  let lines = match command {
    OrderCommand::Market { symbol, side, quantity } => {
      let order = bot.place_market_order(&symbol, side, quantity).await?;
      vec![format!("Market order placed: {}", order)]
    }
    OrderCommand::Limit { symbol, side, quantity, price } => {
      let order = bot.place_limit_order(&symbol, side, quantity, price).await?;
      vec![format!("Limit order placed: {}", order)]
    }
    OrderCommand::StopLimit { symbol, side, quantity, stop_price, limit_price } => {
      let order = bot.place_stop_limit_order(&symbol, side, quantity, stop_price, limit_price).await?;
      vec![format!("Stop-Limit order placed: {}", order)]
    }
    OrderCommand::Oco { symbol, side, quantity, take_profit_price, stop_price } => {
      let orders = bot.place_oco_order(&symbol, side, quantity, take_profit_price, stop_price).await?;
      vec![
        format!("Take profit: {}", orders.take_profit),
        format!("Stop loss:   {}", orders.stop_loss),
      ]
    }
    OrderCommand::Twap { symbol, side, quantity, chunks, interval_seconds } => {
      let report = bot.place_twap_order(&symbol, side, quantity, chunks, interval_seconds).await?;
      let mut lines: Vec<String> = report
        .child_orders
        .iter()
        .filter_map(|c| c.order().map(|o| format!("  chunk {}: {} -> {}", c.sequence_index + 1, c.requested_quantity, o)))
        .collect();
      lines.insert(0, format!("TWAP order placed: {}", report.summary()));
      lines
    }
  };
  Ok(lines)
}
