pub mod execution;
pub mod order;
