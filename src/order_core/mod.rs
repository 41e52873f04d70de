//! 단일 주문 검증 및 제출

pub mod manager;
pub mod validator;

pub use manager::OrderManager;
