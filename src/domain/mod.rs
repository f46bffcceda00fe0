// src/domain/mod.rs
pub mod errors;
pub mod models;
pub mod repository;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, TradingError, TradingResult};
pub use models::{
    DecisionDetails, DecisionResult, ExecutionResult, NextAction, ServiceState, TradeAction,
    TradingAccount, TradingMode, Transaction, TransactionState,
};
pub use repository::{AccountRepository, MarketDataRepository};
