// src/domain/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::signals::{PriceAnalysisSnapshot, SignalSet};
use crate::domain::errors::TradingError;

/// Operational state of a trading account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceState {
    Active,
    Inactive,
    Paused,
    Error,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceState::Active => "ACTIVE",
            ServiceState::Inactive => "INACTIVE",
            ServiceState::Paused => "PAUSED",
            ServiceState::Error => "ERROR",
        }
    }

    pub fn values() -> &'static [&'static str] {
        &["ACTIVE", "INACTIVE", "PAUSED", "ERROR"]
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceState {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(ServiceState::Active),
            "INACTIVE" => Ok(ServiceState::Inactive),
            "PAUSED" => Ok(ServiceState::Paused),
            "ERROR" => Ok(ServiceState::Error),
            other => Err(TradingError::Validation(format!(
                "Invalid service state: {}. Valid states are: {}",
                other,
                ServiceState::values().join(", ")
            ))),
        }
    }
}

/// Which half of the strategy an account runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradingMode {
    Buy,
    Sell,
    Hold,
}

impl TradingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Buy => "BUY",
            TradingMode::Sell => "SELL",
            TradingMode::Hold => "HOLD",
        }
    }

    pub fn values() -> &'static [&'static str] {
        &["BUY", "SELL", "HOLD"]
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TradingMode {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(TradingMode::Buy),
            "SELL" => Ok(TradingMode::Sell),
            "HOLD" => Ok(TradingMode::Hold),
            other => Err(TradingError::Validation(format!(
                "Invalid trading mode: {}. Valid modes are: {}",
                other,
                TradingMode::values().join(", ")
            ))),
        }
    }
}

/// Lifecycle state of a transaction. CLOSED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionState {
    Open,
    Closed,
    Cancelled,
}

impl TransactionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Open => "OPEN",
            TransactionState::Closed => "CLOSED",
            TransactionState::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Closed | TransactionState::Cancelled)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionState {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(TransactionState::Open),
            "CLOSED" => Ok(TransactionState::Closed),
            "CANCELLED" => Ok(TransactionState::Cancelled),
            other => Err(TradingError::Validation(format!(
                "Invalid transaction state: {}",
                other
            ))),
        }
    }
}

/// A configured automated strategy instance tracking funds and position
/// for one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingAccount {
    pub id: i64,
    pub name: String,
    pub stock_symbol: String,
    pub state: ServiceState,
    pub mode: TradingMode,
    pub is_active: bool,

    // Financial configuration
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub minimum_balance: Decimal,
    pub allocation_percent: Decimal,

    // Strategy configuration
    pub buy_threshold: Decimal,
    pub sell_threshold: Decimal,

    // Statistics
    pub current_shares: i64,
    pub buy_count: i64,
    pub sell_count: i64,
    pub total_gain_loss: Decimal,
}

impl TradingAccount {
    /// The account may open a new position: active, in BUY mode, and
    /// holding more than its reserve balance.
    pub fn can_buy(&self) -> bool {
        self.is_active
            && self.state == ServiceState::Active
            && self.mode == TradingMode::Buy
            && self.current_balance > self.minimum_balance
    }

    /// The account may liquidate: active, in SELL mode, and holding shares.
    pub fn can_sell(&self) -> bool {
        self.is_active
            && self.state == ServiceState::Active
            && self.mode == TradingMode::Sell
            && self.current_shares > 0
    }

    pub fn is_profitable(&self) -> bool {
        self.total_gain_loss > Decimal::ZERO
    }
}

/// One buy and its eventual resolution. Created OPEN on purchase and
/// transitions to CLOSED on sale or CANCELLED when voided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub account_id: i64,
    pub stock_symbol: String,
    pub shares: i64,
    pub state: TransactionState,
    pub purchase_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub gain_loss: Option<Decimal>,
    pub purchase_date: DateTime<Utc>,
    pub sale_date: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new OPEN buy transaction.
    pub fn open_buy(
        account_id: i64,
        stock_symbol: &str,
        shares: i64,
        purchase_price: Decimal,
        purchase_date: DateTime<Utc>,
    ) -> Result<Self, TradingError> {
        if shares <= 0 {
            return Err(TradingError::Validation(
                "Shares must be greater than zero".to_string(),
            ));
        }
        if purchase_price <= Decimal::ZERO {
            return Err(TradingError::Validation(
                "Purchase price must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            id: None,
            account_id,
            stock_symbol: stock_symbol.trim().to_uppercase(),
            shares,
            state: TransactionState::Open,
            purchase_price,
            sale_price: None,
            gain_loss: None,
            purchase_date,
            sale_date: None,
        })
    }

    pub fn can_be_cancelled(&self) -> bool {
        self.state == TransactionState::Open
    }

    pub fn total_cost(&self) -> Decimal {
        self.purchase_price * Decimal::from(self.shares)
    }

    /// Complete (sell) an open transaction, recording sale price, date and
    /// realized gain/loss.
    pub fn close(
        &mut self,
        sale_price: Decimal,
        sale_date: DateTime<Utc>,
    ) -> Result<(), TradingError> {
        if sale_price <= Decimal::ZERO {
            return Err(TradingError::Validation(
                "Sale price must be greater than zero".to_string(),
            ));
        }
        if self.state != TransactionState::Open {
            return Err(TradingError::InvalidTransactionState(format!(
                "Transaction cannot be completed because it is not open (current state: {})",
                self.state
            )));
        }

        self.sale_price = Some(sale_price);
        self.sale_date = Some(sale_date);
        self.gain_loss = Some((sale_price - self.purchase_price) * Decimal::from(self.shares));
        self.state = TransactionState::Closed;
        Ok(())
    }

    /// Void an open transaction. The refund of the purchase amount is the
    /// caller's responsibility.
    pub fn cancel(&mut self) -> Result<(), TradingError> {
        if !self.can_be_cancelled() {
            return Err(TradingError::InvalidTransactionState(format!(
                "Transaction cannot be cancelled because it is in state: {}",
                self.state
            )));
        }

        self.state = TransactionState::Cancelled;
        Ok(())
    }
}

/// Action taken by a strategy execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    None,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
            TradeAction::None => write!(f, "none"),
        }
    }
}

/// Recommended next step from a read-only condition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextAction {
    Buy,
    Sell,
    Wait,
}

/// Read-only decision payload returned by the condition-check entry points.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionResult {
    pub should_proceed: bool,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub details: DecisionDetails,
    pub next_action: NextAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionDetails {
    pub price_analysis: PriceAnalysisSnapshot,
    pub account_id: i64,
    pub stock_symbol: Option<String>,
    pub current_price: Option<f64>,
}

/// Full payload of a strategy execution. Always well-formed: business
/// failures are reported here, never as errors from the entry points.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub account_id: i64,
    pub action: TradeAction,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_shares: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TradingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<SignalSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares_bought: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares_sold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_gain_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
}

impl ExecutionResult {
    /// Structured failure with no action taken.
    pub fn failure(account_id: i64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            account_id,
            action: TradeAction::None,
            message: message.into(),
            stock_symbol: None,
            current_price: None,
            current_balance: None,
            current_shares: None,
            mode: None,
            signals: None,
            shares_bought: None,
            total_cost: None,
            shares_sold: None,
            total_revenue: None,
            realized_gain_loss: None,
            transaction_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn open_transaction() -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        Transaction::open_buy(7, "acme", 10, dec!(25.00), at).unwrap()
    }

    #[test]
    fn open_buy_normalizes_symbol_and_starts_open() {
        let txn = open_transaction();
        assert_eq!(txn.stock_symbol, "ACME");
        assert_eq!(txn.state, TransactionState::Open);
        assert_eq!(txn.total_cost(), dec!(250.00));
        assert!(txn.sale_price.is_none());
        assert!(txn.gain_loss.is_none());
    }

    #[test]
    fn open_buy_rejects_bad_input() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap();
        assert!(Transaction::open_buy(7, "ACME", 0, dec!(25.00), at).is_err());
        assert!(Transaction::open_buy(7, "ACME", 10, dec!(0), at).is_err());
    }

    #[test]
    fn close_records_gain_loss() {
        let mut txn = open_transaction();
        let sold = Utc.with_ymd_and_hms(2024, 3, 8, 14, 30, 0).unwrap();
        txn.close(dec!(27.50), sold).unwrap();

        assert_eq!(txn.state, TransactionState::Closed);
        assert_eq!(txn.sale_price, Some(dec!(27.50)));
        assert_eq!(txn.sale_date, Some(sold));
        // (27.50 - 25.00) * 10
        assert_eq!(txn.gain_loss, Some(dec!(25.00)));
    }

    #[test]
    fn close_records_loss_when_price_dropped() {
        let mut txn = open_transaction();
        let sold = Utc.with_ymd_and_hms(2024, 3, 8, 14, 30, 0).unwrap();
        txn.close(dec!(24.00), sold).unwrap();
        assert_eq!(txn.gain_loss, Some(dec!(-10.00)));
    }

    #[test]
    fn terminal_states_reject_further_mutation() {
        let sold = Utc.with_ymd_and_hms(2024, 3, 8, 14, 30, 0).unwrap();

        let mut closed = open_transaction();
        closed.close(dec!(27.50), sold).unwrap();
        let before = closed.clone();
        assert!(closed.close(dec!(30.00), sold).is_err());
        assert!(closed.cancel().is_err());
        assert_eq!(closed, before);

        let mut cancelled = open_transaction();
        cancelled.cancel().unwrap();
        assert_eq!(cancelled.state, TransactionState::Cancelled);
        assert!(cancelled.close(dec!(30.00), sold).is_err());
        assert!(cancelled.cancel().is_err());
    }

    #[test]
    fn state_strings_round_trip() {
        for s in ServiceState::values() {
            assert_eq!(s.parse::<ServiceState>().unwrap().as_str(), *s);
        }
        for m in TradingMode::values() {
            assert_eq!(m.parse::<TradingMode>().unwrap().as_str(), *m);
        }
        for t in ["OPEN", "CLOSED", "CANCELLED"] {
            assert_eq!(t.parse::<TransactionState>().unwrap().as_str(), t);
        }
        assert!("SHORT".parse::<TradingMode>().is_err());
    }

    fn sample_account() -> TradingAccount {
        TradingAccount {
            id: 1,
            name: "ACME runner".to_string(),
            stock_symbol: "ACME".to_string(),
            state: ServiceState::Active,
            mode: TradingMode::Buy,
            is_active: true,
            initial_balance: dec!(1000),
            current_balance: dec!(1000),
            minimum_balance: dec!(100),
            allocation_percent: dec!(50),
            buy_threshold: dec!(3.0),
            sell_threshold: dec!(2.0),
            current_shares: 0,
            buy_count: 0,
            sell_count: 0,
            total_gain_loss: Decimal::ZERO,
        }
    }

    #[test]
    fn can_buy_requires_active_buy_mode_and_funds() {
        let account = sample_account();
        assert!(account.can_buy());

        let mut paused = account.clone();
        paused.state = ServiceState::Paused;
        assert!(!paused.can_buy());

        let mut disabled = account.clone();
        disabled.is_active = false;
        assert!(!disabled.can_buy());

        let mut holding = account.clone();
        holding.mode = TradingMode::Hold;
        assert!(!holding.can_buy());

        let mut broke = account.clone();
        broke.current_balance = broke.minimum_balance;
        assert!(!broke.can_buy());
    }

    #[test]
    fn can_sell_requires_shares() {
        let mut account = sample_account();
        account.mode = TradingMode::Sell;
        assert!(!account.can_sell());

        account.current_shares = 5;
        assert!(account.can_sell());

        account.state = ServiceState::Inactive;
        assert!(!account.can_sell());
    }

    #[test]
    fn profitability_follows_total_gain_loss() {
        let mut account = sample_account();
        assert!(!account.is_profitable());
        account.total_gain_loss = dec!(0.01);
        assert!(account.is_profitable());
    }
}
