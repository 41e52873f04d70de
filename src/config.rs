/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TradingError;
use crate::exchange::binance_futures::TESTNET_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
    pub twap: TwapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    pub recv_window_ms: u64,
    /// 주문을 실제로 보내지 않고 로그만 남김
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwapConfig {
    pub default_chunks: u32,
    pub default_interval_secs: f64,
    /// 분할 수량 소수점 자리수 (거래소 step size 에 맞춤)
    pub quantity_precision: u32,
}

impl Config {
    /// 기본값 → config.{toml,json,...} → BOT__ 환경변수 순으로 설정 로드
    pub fn load() -> Result<Self, TradingError> {
        Self::load_from(None)
    }

    /// Load configuration, using `path` instead of the default `config.*` lookup
    pub fn load_from(path: Option<&Path>) -> Result<Self, TradingError> {
        Self::load_layered(path, None, |key| std::env::var(key).ok())
    }

    /// `env` 가 주어지면 프로세스 환경 대신 그 값으로 `BOT__` 계층과 재정의를 적용
    fn load_layered<F>(
        path: Option<&Path>,
        env: Option<::config::Map<String, String>>,
        lookup: F,
    ) -> Result<Self, TradingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ::config::Config::try_from(&Config::default())?;

        let mut builder = ::config::Config::builder().add_source(defaults);
        builder = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(TradingError::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                builder.add_source(::config::File::from(p).required(true))
            }
            None => builder.add_source(::config::File::with_name("config").required(false)),
        };
        builder = builder.add_source(
            ::config::Environment::with_prefix("BOT")
                .separator("__")
                .source(env),
        );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        // environment overrides
        cfg.apply_overrides(lookup);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply BINANCE_* / DRY_RUN overrides for sensitive/runtime fields. Empty values are ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = get("BINANCE_API_KEY") { self.exchange.api_key = Some(v); }
        if let Some(v) = get("BINANCE_API_SECRET") { self.exchange.api_secret = Some(v); }
        if let Some(v) = get("BINANCE_BASE_URL") { self.exchange.base_url = Some(v); }
        if let Some(v) = get("DRY_RUN") {
            let lower = v.to_lowercase();
            if ["1","true","yes"].contains(&lower.as_str()) { self.exchange.dry_run = true; }
            if ["0","false","no"].contains(&lower.as_str()) { self.exchange.dry_run = false; }
        }
    }

    fn validate(&self) -> Result<(), TradingError> {
        if self.twap.default_chunks == 0 {
            return Err(TradingError::Config("twap.default_chunks must be positive".to_string()));
        }
        if !self.twap.default_interval_secs.is_finite() || self.twap.default_interval_secs < 0.0 {
            return Err(TradingError::Config("twap.default_interval_secs must be non-negative".to_string()));
        }
        if self.twap.quantity_precision > 28 {
            return Err(TradingError::Config("twap.quantity_precision must be at most 28".to_string()));
        }
        Ok(())
    }

    /// API 키가 모두 설정되어 있는지 여부
    pub fn has_credentials(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().map(|s| !s.is_empty()).unwrap_or(false);
        set(&self.exchange.api_key) && set(&self.exchange.api_secret)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exchange: ExchangeConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: Some("bot.log".to_string()),
            },
            twap: TwapConfig {
                default_chunks: 5,
                default_interval_secs: 10.0,
                quantity_precision: 8,
            },
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            base_url: Some(TESTNET_BASE_URL.to_string()),
            recv_window_ms: 5000,
            dry_run: false,
        }
    }
}
