// src/domain/errors.rs
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Trading error: {0}")]
    Trading(#[from] TradingError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Trading account with ID {0} not found")]
    AccountNotFound(i64),

    #[error("Stock {0} not found")]
    StockNotFound(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Insufficient funds. Required: ${required:.2}, Available: ${available:.2}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid transaction state: {0}")]
    InvalidTransactionState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

// Result type aliases for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type TradingResult<T> = Result<T, TradingError>;
