use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::str::FromStr;

use crate::config::ExchangeConfig;
use crate::error::TradingError;
use crate::exchange::traits::OrderSubmitter;
use crate::models::order::{OrderId, OrderRequest, OrderResult};
use crate::utils::current_timestamp_ms;

type HmacSha256 = Hmac<Sha256>;

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

/// Binance USDT-M Futures REST connector (order placement subset)
pub struct BinanceFuturesExchange {
  pub base_url: String,
  pub api_key: String,
  api_secret: String,
  pub recv_window_ms: u64,
  pub http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
  order_id: i64,
  client_order_id: Option<String>,
  symbol: String,
  status: String,
  orig_qty: Option<String>,
  executed_qty: Option<String>,
  avg_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
  code: i64,
  msg: String,
}

impl BinanceFuturesExchange {
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
    BinanceFuturesExchange {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key: api_key.into(),
      api_secret: api_secret.into(),
      recv_window_ms: 5000,
      http: reqwest::Client::new(),
    }
  }

  pub fn from_config(config: &ExchangeConfig) -> Result<Self, TradingError> {
    let api_key = config.api_key.clone()
      .filter(|k| !k.is_empty())
      .ok_or_else(|| TradingError::Config("exchange.api_key is not set".to_string()))?;
    let api_secret = config.api_secret.clone()
      .filter(|s| !s.is_empty())
      .ok_or_else(|| TradingError::Config("exchange.api_secret is not set".to_string()))?;
    let base_url = config.base_url.clone().unwrap_or_else(|| TESTNET_BASE_URL.to_string());

    let mut exchange = Self::new(base_url, api_key, api_secret);
    exchange.recv_window_ms = config.recv_window_ms;
    Ok(exchange)
  }

  fn sign(&self, query: &str) -> Result<String, TradingError> {
    let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
      .map_err(|e| TradingError::Config(format!("invalid api secret: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
  }

  /// Appends timestamp/recvWindow and the signature to an unsigned parameter list
  fn signed_query(&self, mut params: Vec<(String, String)>) -> Result<String, TradingError> {
    params.push(("recvWindow".to_string(), self.recv_window_ms.to_string()));
    params.push(("timestamp".to_string(), current_timestamp_ms().to_string()));
    let query = encode_query(&params);
    let signature = self.sign(&query)?;
    Ok(format!("{}&signature={}", query, signature))
  }

  async fn send(&self, method: reqwest::Method, params: Vec<(String, String)>) -> Result<serde_json::Value, TradingError> {
    let query = self.signed_query(params)?;
    let url = format!("{}/fapi/v1/order?{}", self.base_url, query);
    let res = self.http
      .request(method.clone(), url)
      .header("X-MBX-APIKEY", &self.api_key)
      .send().await
      .map_err(|e| TradingError::Submission(format!("{} /fapi/v1/order http error: {}", method, e)))?;

    let status = res.status();
    let body = res.text().await
      .map_err(|e| TradingError::Submission(format!("failed to read response body: {}", e)))?;

    if !status.is_success() {
      return Err(decode_error(status.as_u16(), &body));
    }

    Ok(serde_json::from_str(&body)?)
  }
}

/// Builds the unsigned `/fapi/v1/order` parameters for a request
pub fn order_params(request: &OrderRequest) -> Vec<(String, String)> {
  let mut params = vec![
    ("symbol".to_string(), request.symbol.clone()),
    ("side".to_string(), request.side.as_str().to_string()),
    ("type".to_string(), request.order_type.as_str().to_string()),
  ];
  if let Some(tif) = request.time_in_force {
    params.push(("timeInForce".to_string(), tif.as_str().to_string()));
  }
  if let Some(qty) = request.quantity {
    params.push(("quantity".to_string(), qty.normalize().to_string()));
  }
  if let Some(price) = request.price {
    params.push(("price".to_string(), price.normalize().to_string()));
  }
  if let Some(stop_price) = request.stop_price {
    params.push(("stopPrice".to_string(), stop_price.normalize().to_string()));
  }
  if request.reduce_only {
    params.push(("reduceOnly".to_string(), "true".to_string()));
  }
  if let Some(client_id) = &request.client_order_id {
    params.push(("newClientOrderId".to_string(), client_id.clone()));
  }
  // market orders report executedQty only with RESULT
  params.push(("newOrderRespType".to_string(), "RESULT".to_string()));
  params
}

fn encode_query(params: &[(String, String)]) -> String {
  params
    .iter()
    .map(|(k, v)| format!("{}={}", k, v))
    .collect::<Vec<_>>()
    .join("&")
}

fn decode_error(status: u16, body: &str) -> TradingError {
  match serde_json::from_str::<ApiError>(body) {
    Ok(err) => TradingError::Submission(format!("binance error {} (http {}): {}", err.code, status, err.msg)),
    Err(_) => TradingError::Submission(format!("http {}: {}", status, body)),
  }
}

fn parse_decimal(value: Option<&String>) -> Option<Decimal> {
  value.and_then(|v| Decimal::from_str(v).ok())
}

fn to_order_result(request: &OrderRequest, response: OrderResponse) -> OrderResult {
  OrderResult {
    order_id: OrderId(response.order_id.to_string()),
    client_order_id: response.client_order_id.clone(),
    symbol: response.symbol,
    side: request.side,
    order_type: request.order_type,
    status: response.status,
    orig_qty: parse_decimal(response.orig_qty.as_ref()),
    executed_qty: parse_decimal(response.executed_qty.as_ref()),
    // 미체결 주문은 avgPrice 가 "0" 으로 온다
    avg_price: parse_decimal(response.avg_price.as_ref()).filter(|p| !p.is_zero()),
  }
}

#[async_trait]
impl OrderSubmitter for BinanceFuturesExchange {
  async fn create_order(&mut self, request: OrderRequest) -> Result<OrderResult, TradingError> {
    let json = self.send(reqwest::Method::POST, order_params(&request)).await?;
    let response: OrderResponse = serde_json::from_value(json)?;
    log::debug!("binance order response: {:?}", response);
    Ok(to_order_result(&request, response))
  }

  async fn cancel_order(&mut self, symbol: &str, order_id: &OrderId) -> Result<(), TradingError> {
    let params = vec![
      ("symbol".to_string(), symbol.to_string()),
      ("orderId".to_string(), order_id.0.clone()),
    ];
    self.send(reqwest::Method::DELETE, params).await?;
    Ok(())
  }
}
