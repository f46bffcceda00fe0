// src/infrastructure/memory.rs
// In-memory repository implementations backing tests and the demo runner

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::errors::{TradingError, TradingResult};
use crate::domain::models::{TradingAccount, Transaction, TransactionState};
use crate::domain::repository::{AccountRepository, MarketDataRepository};

/// Market data held as symbol -> closing prices (oldest to newest).
#[derive(Default)]
pub struct InMemoryMarketData {
    closes: Mutex<HashMap<String, Vec<f64>>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_closes(&self, symbol: &str, closes: Vec<f64>) {
        let mut data = self.closes.lock().unwrap();
        data.insert(symbol.trim().to_uppercase(), closes);
    }
}

#[async_trait]
impl MarketDataRepository for InMemoryMarketData {
    async fn stock_exists(&self, symbol: &str) -> TradingResult<bool> {
        let data = self.closes.lock().unwrap();
        Ok(data.contains_key(&symbol.trim().to_uppercase()))
    }

    async fn recent_closes(&self, symbol: &str, lookback_days: usize) -> TradingResult<Vec<f64>> {
        let data = self.closes.lock().unwrap();
        let closes = match data.get(&symbol.trim().to_uppercase()) {
            Some(closes) => closes,
            None => return Ok(Vec::new()),
        };

        let start = closes.len().saturating_sub(lookback_days);
        Ok(closes[start..].to_vec())
    }
}

#[derive(Default)]
struct Ledger {
    accounts: HashMap<i64, TradingAccount>,
    transactions: HashMap<i64, Transaction>,
    next_transaction_id: i64,
}

/// Accounts and their transaction rows behind a single mutex, so each
/// commit call observes and applies its changes atomically.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    ledger: Mutex<Ledger>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_account(&self, account: TradingAccount) {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.accounts.insert(account.id, account);
    }

    /// Seed a transaction row directly, assigning it an ID.
    pub fn insert_transaction(&self, mut transaction: Transaction) -> i64 {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.next_transaction_id += 1;
        let id = ledger.next_transaction_id;
        transaction.id = Some(id);
        ledger.transactions.insert(id, transaction);
        id
    }

    pub fn transaction(&self, id: i64) -> Option<Transaction> {
        let ledger = self.ledger.lock().unwrap();
        ledger.transactions.get(&id).cloned()
    }

    pub fn transactions_for(&self, account_id: i64) -> Vec<Transaction> {
        let ledger = self.ledger.lock().unwrap();
        let mut rows: Vec<Transaction> = ledger
            .transactions
            .values()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.id);
        rows
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_account(&self, account_id: i64) -> TradingResult<Option<TradingAccount>> {
        let ledger = self.ledger.lock().unwrap();
        Ok(ledger.accounts.get(&account_id).cloned())
    }

    async fn open_transactions(&self, account_id: i64) -> TradingResult<Vec<Transaction>> {
        let ledger = self.ledger.lock().unwrap();
        let mut rows: Vec<Transaction> = ledger
            .transactions
            .values()
            .filter(|t| t.account_id == account_id && t.state == TransactionState::Open)
            .cloned()
            .collect();
        rows.sort_by_key(|t| (t.purchase_date, t.id));
        Ok(rows)
    }

    async fn commit_buy(
        &self,
        account: &TradingAccount,
        transaction: &Transaction,
    ) -> TradingResult<i64> {
        let mut ledger = self.ledger.lock().unwrap();

        if !ledger.accounts.contains_key(&account.id) {
            return Err(TradingError::AccountNotFound(account.id));
        }

        ledger.next_transaction_id += 1;
        let id = ledger.next_transaction_id;
        let mut row = transaction.clone();
        row.id = Some(id);
        ledger.transactions.insert(id, row);
        ledger.accounts.insert(account.id, account.clone());
        Ok(id)
    }

    async fn commit_sell(
        &self,
        account: &TradingAccount,
        closed: &[Transaction],
    ) -> TradingResult<()> {
        let mut ledger = self.ledger.lock().unwrap();

        if !ledger.accounts.contains_key(&account.id) {
            return Err(TradingError::AccountNotFound(account.id));
        }
        for transaction in closed {
            let id = transaction.id.ok_or_else(|| {
                TradingError::Repository("cannot close a transaction without an ID".to_string())
            })?;
            if !ledger.transactions.contains_key(&id) {
                return Err(TradingError::Repository(format!(
                    "transaction {} not found",
                    id
                )));
            }
        }

        for transaction in closed {
            let id = transaction.id.expect("checked above");
            ledger.transactions.insert(id, transaction.clone());
        }
        ledger.accounts.insert(account.id, account.clone());
        Ok(())
    }
}
