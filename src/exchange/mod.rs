pub mod binance_futures;
pub mod dry_run;
pub mod mocks;
pub mod traits;

pub use binance_futures::BinanceFuturesExchange;
pub use dry_run::DryRunExchange;
pub use mocks::MockExchange;
pub use traits::OrderSubmitter;
