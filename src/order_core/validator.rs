use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use crate::error::TradingError;
use crate::models::order::{OrderRequest, OrderSide, OrderType};

/// 주문 검증기 인터페이스
pub trait OrderValidator: Send + Sync {
    /// 주문 검증
    fn validate(&self, order: &OrderRequest) -> Result<(), TradingError>;
}

/// 기본 주문 검증기 - 주문 유형별 필수 필드와 부호 확인
pub struct BasicOrderValidator;

impl OrderValidator for BasicOrderValidator {
    fn validate(&self, order: &OrderRequest) -> Result<(), TradingError> {
        if order.symbol.trim().is_empty() {
            return Err(TradingError::Validation("Symbol must not be empty".to_string()));
        }

        if let Some(qty) = order.quantity {
            require_positive("Quantity", qty)?;
        }
        if let Some(price) = order.price {
            require_positive("Price", price)?;
        }
        if let Some(stop_price) = order.stop_price {
            require_positive("Stop price", stop_price)?;
        }

        let missing = |field: &str| {
            TradingError::Validation(format!("{} order requires {}", order.order_type, field))
        };
        if order.quantity.is_none() {
            return Err(missing("quantity"));
        }
        match order.order_type {
            OrderType::Market => {}
            OrderType::Limit => {
                order.price.ok_or_else(|| missing("price"))?;
            }
            OrderType::Stop => {
                order.price.ok_or_else(|| missing("price"))?;
                order.stop_price.ok_or_else(|| missing("stop price"))?;
            }
            OrderType::StopMarket | OrderType::TakeProfitMarket => {
                order.stop_price.ok_or_else(|| missing("stop price"))?;
            }
        }

        Ok(())
    }
}

/// 심볼 정규화 (공백 제거, 대문자)
pub fn normalize_symbol(symbol: &str) -> Result<String, TradingError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(TradingError::Validation("Symbol must not be empty".to_string()));
    }
    Ok(symbol)
}

pub fn parse_side(side: &str) -> Result<OrderSide, TradingError> {
    side.parse()
}

pub fn require_positive(name: &str, value: Decimal) -> Result<Decimal, TradingError> {
    if value <= Decimal::ZERO {
        return Err(TradingError::Validation(format!("{} must be positive", name)));
    }
    Ok(value)
}

/// 양수 decimal 파싱
pub fn parse_positive_decimal(name: &str, input: &str) -> Result<Decimal, TradingError> {
    let value = Decimal::from_str(input.trim())
        .map_err(|_| TradingError::Validation(format!("{} must be a number, got '{}'", name, input.trim())))?;
    require_positive(name, value)
}

pub fn validate_chunk_count(chunks: u32) -> Result<u32, TradingError> {
    if chunks == 0 {
        return Err(TradingError::Validation("Chunk count must be positive".to_string()));
    }
    Ok(chunks)
}

/// 분할 간격(초) 검증 후 Duration 변환
pub fn validate_interval(interval_seconds: f64) -> Result<Duration, TradingError> {
    if !interval_seconds.is_finite() || interval_seconds < 0.0 {
        return Err(TradingError::Validation("Interval must be a non-negative number of seconds".to_string()));
    }
    Duration::try_from_secs_f64(interval_seconds)
        .map_err(|e| TradingError::Validation(format!("Interval out of range: {}", e)))
}

/// OCO 가격 순서 검증
///
/// 매수 포지션: 익절가 > 손절가, 매도 포지션: 익절가 < 손절가
pub fn validate_oco_prices(side: OrderSide, take_profit_price: Decimal, stop_price: Decimal) -> Result<(), TradingError> {
    require_positive("Take profit price", take_profit_price)?;
    require_positive("Stop price", stop_price)?;

    let ordered = match side {
        OrderSide::Buy => take_profit_price > stop_price,
        OrderSide::Sell => take_profit_price < stop_price,
    };
    if !ordered {
        let relation = match side {
            OrderSide::Buy => "above",
            OrderSide::Sell => "below",
        };
        return Err(TradingError::Validation(format!(
            "For a {} position the take profit price ({}) must be {} the stop price ({})",
            side, take_profit_price, relation, stop_price
        )));
    }
    Ok(())
}
