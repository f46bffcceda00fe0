// src/domain/repository/mod.rs
// Repository interfaces for the engine's external collaborators

use async_trait::async_trait;

use crate::domain::errors::TradingResult;
use crate::domain::models::{TradingAccount, Transaction};

/// Source of historical market data. Backed in production by cached daily
/// price tables; an empty or short series means "no data yet", not an error.
#[async_trait]
pub trait MarketDataRepository: Send + Sync {
    async fn stock_exists(&self, symbol: &str) -> TradingResult<bool>;

    /// Closing prices for the last `lookback_days` days, oldest to newest.
    async fn recent_closes(&self, symbol: &str, lookback_days: usize) -> TradingResult<Vec<f64>>;
}

/// Persistence for trading accounts and their transaction ledger.
///
/// Each commit method is a single all-or-nothing unit: the stored account
/// and transaction rows change together or not at all. The caller holds at
/// most one in-flight mutation per account.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_account(&self, account_id: i64) -> TradingResult<Option<TradingAccount>>;

    /// All OPEN transactions for an account, oldest purchase first.
    async fn open_transactions(&self, account_id: i64) -> TradingResult<Vec<Transaction>>;

    /// Persist a buy: the mutated account plus a new OPEN transaction.
    /// Returns the ID assigned to the transaction.
    async fn commit_buy(
        &self,
        account: &TradingAccount,
        transaction: &Transaction,
    ) -> TradingResult<i64>;

    /// Persist a full-position sell: the mutated account plus every
    /// position transaction transitioned to CLOSED.
    async fn commit_sell(
        &self,
        account: &TradingAccount,
        closed: &[Transaction],
    ) -> TradingResult<()>;
}
