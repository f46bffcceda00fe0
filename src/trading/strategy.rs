// src/trading/strategy.rs
// Strategy executor: validates an account, analyzes its price history and
// applies the resulting buy/sell mutations through the account repository

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::analysis::signals::{get_price_analysis, PriceAnalysisSnapshot};
use crate::config::EngineConfig;
use crate::domain::errors::TradingError;
use crate::domain::models::{
    DecisionDetails, DecisionResult, ExecutionResult, NextAction, ServiceState, TradeAction,
    TradingAccount, TradingMode, Transaction,
};
use crate::domain::repository::{AccountRepository, MarketDataRepository};
use crate::trading::rules::{should_buy, should_sell};

/// Runs the trading strategy for one account per call.
///
/// All entry points return a structured payload; business failures are
/// reported in the payload rather than as errors. Each call performs at
/// most one repository commit, and concurrent calls for the same account
/// must be serialized by the caller.
pub struct StrategyExecutor {
    market_data: Arc<dyn MarketDataRepository>,
    accounts: Arc<dyn AccountRepository>,
    config: EngineConfig,
}

/// Validation output shared by the execute and condition-check paths.
struct ValidatedStrategy {
    account: TradingAccount,
    snapshot: PriceAnalysisSnapshot,
    current_price: f64,
}

impl StrategyExecutor {
    pub fn new(
        market_data: Arc<dyn MarketDataRepository>,
        accounts: Arc<dyn AccountRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            market_data,
            accounts,
            config,
        }
    }

    /// Execute the trading strategy for an account: validate, analyze,
    /// then buy, sell or hold according to the account's mode.
    pub async fn execute(&self, account_id: i64) -> ExecutionResult {
        let validated = match self.validate_strategy(account_id).await {
            Ok(validated) => validated,
            Err(message) => return ExecutionResult::failure(account_id, message),
        };

        let ValidatedStrategy {
            account,
            snapshot,
            current_price,
        } = validated;

        let result = ExecutionResult {
            success: true,
            account_id,
            action: TradeAction::None,
            message: String::new(),
            stock_symbol: Some(account.stock_symbol.clone()),
            current_price: Some(current_price),
            current_balance: Some(account.current_balance),
            current_shares: Some(account.current_shares),
            mode: Some(account.mode),
            signals: Some(snapshot.signals),
            shares_bought: None,
            total_cost: None,
            shares_sold: None,
            total_revenue: None,
            realized_gain_loss: None,
            transaction_id: None,
        };

        match account.mode {
            TradingMode::Buy => {
                self.execute_buy(account, &snapshot, current_price, result)
                    .await
            }
            TradingMode::Sell => {
                self.execute_sell(account, &snapshot, current_price, result)
                    .await
            }
            TradingMode::Hold => {
                let mut result = result;
                result.message = "Account is in HOLD mode, no actions taken".to_string();
                result
            }
        }
    }

    /// Read-only preview of the buy decision. Mutates nothing.
    pub async fn check_buy_condition(&self, account_id: i64) -> DecisionResult {
        match self.validate_strategy(account_id).await {
            Ok(validated) => {
                let proceed = should_buy(
                    &validated.account,
                    &validated.snapshot,
                    validated.current_price,
                );
                Self::decision(
                    account_id,
                    proceed,
                    "Buy conditions met",
                    "Buy conditions not met",
                    NextAction::Buy,
                    validated,
                )
            }
            Err(message) => Self::failed_decision(account_id, message),
        }
    }

    /// Read-only preview of the sell decision. Mutates nothing.
    pub async fn check_sell_condition(&self, account_id: i64) -> DecisionResult {
        match self.validate_strategy(account_id).await {
            Ok(validated) => {
                let proceed = should_sell(&validated.account, &validated.snapshot);
                Self::decision(
                    account_id,
                    proceed,
                    "Sell conditions met",
                    "Sell conditions not met",
                    NextAction::Sell,
                    validated,
                )
            }
            Err(message) => Self::failed_decision(account_id, message),
        }
    }

    /// Validate preconditions and assemble the analysis context: the
    /// account must be active, its stock resolvable, and enough price
    /// history available to produce a snapshot with a usable latest price.
    async fn validate_strategy(&self, account_id: i64) -> Result<ValidatedStrategy, String> {
        let account = self
            .accounts
            .find_account(account_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| TradingError::AccountNotFound(account_id).to_string())?;

        if !account.is_active || account.state != ServiceState::Active {
            return Err(format!(
                "Account is not active (state: {}, is_active: {})",
                account.state, account.is_active
            ));
        }

        let exists = self
            .market_data
            .stock_exists(&account.stock_symbol)
            .await
            .map_err(|e| e.to_string())?;
        if !exists {
            return Err(TradingError::StockNotFound(account.stock_symbol.clone()).to_string());
        }

        let close_prices = self
            .market_data
            .recent_closes(&account.stock_symbol, self.config.lookback_days)
            .await
            .map_err(|e| e.to_string())?;
        if close_prices.len() < self.config.min_data_points {
            return Err("Insufficient price data for analysis".to_string());
        }

        let snapshot = get_price_analysis(&close_prices);
        if !snapshot.has_data {
            return Err("Insufficient price data for analysis".to_string());
        }

        let current_price = snapshot
            .latest_price
            .filter(|price| *price > 0.0)
            .ok_or_else(|| "Could not determine current price".to_string())?;

        Ok(ValidatedStrategy {
            account,
            snapshot,
            current_price,
        })
    }

    async fn execute_buy(
        &self,
        account: TradingAccount,
        snapshot: &PriceAnalysisSnapshot,
        current_price: f64,
        mut result: ExecutionResult,
    ) -> ExecutionResult {
        if !should_buy(&account, snapshot, current_price) {
            result.message = "Buy conditions not met".to_string();
            return result;
        }

        let Some(price) = Decimal::from_f64(current_price).filter(|p| *p > Decimal::ZERO) else {
            result.success = false;
            result.message = "Could not determine current price".to_string();
            return result;
        };

        let max_shares_affordable = (account.current_balance / price)
            .floor()
            .to_i64()
            .unwrap_or(0);
        let allocation_amount = account.current_balance * account.allocation_percent
            / Decimal::ONE_HUNDRED;
        let allocated_shares = (allocation_amount / price).floor().to_i64().unwrap_or(0);
        let shares_to_buy = allocated_shares.min(max_shares_affordable).max(1);

        if shares_to_buy <= 0 {
            result.message = "Not enough funds to buy shares".to_string();
            return result;
        }

        let total_cost = price * Decimal::from(shares_to_buy);
        if total_cost > account.current_balance {
            log::warn!(
                "Buy rejected for account {}: cost {} exceeds balance {}",
                account.id,
                total_cost,
                account.current_balance
            );
            result.success = false;
            result.message = TradingError::InsufficientFunds {
                required: total_cost,
                available: account.current_balance,
            }
            .to_string();
            return result;
        }

        let transaction = match Transaction::open_buy(
            account.id,
            &account.stock_symbol,
            shares_to_buy,
            price,
            Utc::now(),
        ) {
            Ok(transaction) => transaction,
            Err(e) => {
                result.success = false;
                result.message = format!("Error executing buy transaction: {}", e);
                return result;
            }
        };

        let mut updated = account;
        updated.current_balance -= total_cost;
        updated.buy_count += 1;
        updated.current_shares += shares_to_buy;

        match self.accounts.commit_buy(&updated, &transaction).await {
            Ok(transaction_id) => {
                log::info!(
                    "Account {}: bought {} shares of {} at {} (cost {})",
                    updated.id,
                    shares_to_buy,
                    updated.stock_symbol,
                    price,
                    total_cost
                );
                result.action = TradeAction::Buy;
                result.shares_bought = Some(shares_to_buy);
                result.total_cost = Some(total_cost);
                result.transaction_id = Some(transaction_id);
                result.current_balance = Some(updated.current_balance);
                result.current_shares = Some(updated.current_shares);
                result.message = format!("Bought {} shares at ${:.2}", shares_to_buy, price);
                result
            }
            Err(e) => {
                log::error!("Error executing buy transaction: {}", e);
                result.success = false;
                result.message = format!("Error executing buy transaction: {}", e);
                result
            }
        }
    }

    async fn execute_sell(
        &self,
        account: TradingAccount,
        snapshot: &PriceAnalysisSnapshot,
        current_price: f64,
        mut result: ExecutionResult,
    ) -> ExecutionResult {
        if !should_sell(&account, snapshot) {
            result.message = "Sell conditions not met".to_string();
            return result;
        }

        if account.current_shares <= 0 {
            result.message = "No shares available to sell".to_string();
            return result;
        }

        let Some(price) = Decimal::from_f64(current_price).filter(|p| *p > Decimal::ZERO) else {
            result.success = false;
            result.message = "Could not determine current price".to_string();
            return result;
        };

        let open_transactions = match self.accounts.open_transactions(account.id).await {
            Ok(transactions) => transactions,
            Err(e) => {
                log::error!("Error executing sell transaction: {}", e);
                result.success = false;
                result.message = format!("Error executing sell transaction: {}", e);
                return result;
            }
        };

        // Full-position sell: every open purchase closes at the current
        // price and contributes its realized gain/loss.
        let sale_date = Utc::now();
        let mut closed = Vec::with_capacity(open_transactions.len());
        let mut realized_gain_loss = Decimal::ZERO;
        for mut transaction in open_transactions {
            if let Err(e) = transaction.close(price, sale_date) {
                result.success = false;
                result.message = format!("Error executing sell transaction: {}", e);
                return result;
            }
            realized_gain_loss += transaction.gain_loss.unwrap_or_default();
            closed.push(transaction);
        }

        let shares_sold = account.current_shares;
        let total_revenue = price * Decimal::from(shares_sold);

        let mut updated = account;
        updated.current_balance += total_revenue;
        updated.sell_count += 1;
        updated.current_shares = 0;
        updated.total_gain_loss += realized_gain_loss;

        match self.accounts.commit_sell(&updated, &closed).await {
            Ok(()) => {
                log::info!(
                    "Account {}: sold {} shares of {} at {} (revenue {}, gain/loss {})",
                    updated.id,
                    shares_sold,
                    updated.stock_symbol,
                    price,
                    total_revenue,
                    realized_gain_loss
                );
                result.action = TradeAction::Sell;
                result.shares_sold = Some(shares_sold);
                result.total_revenue = Some(total_revenue);
                result.realized_gain_loss = Some(realized_gain_loss);
                result.transaction_id = closed.first().and_then(|t| t.id);
                result.current_balance = Some(updated.current_balance);
                result.current_shares = Some(0);
                result.message = format!("Sold {} shares at ${:.2}", shares_sold, price);
                result
            }
            Err(e) => {
                log::error!("Error executing sell transaction: {}", e);
                result.success = false;
                result.message = format!("Error executing sell transaction: {}", e);
                result
            }
        }
    }

    fn decision(
        account_id: i64,
        proceed: bool,
        met: &str,
        not_met: &str,
        action_when_met: NextAction,
        validated: ValidatedStrategy,
    ) -> DecisionResult {
        let details = DecisionDetails {
            price_analysis: validated.snapshot,
            account_id,
            stock_symbol: Some(validated.account.stock_symbol),
            current_price: Some(validated.current_price),
        };

        DecisionResult {
            should_proceed: proceed,
            reason: if proceed { met } else { not_met }.to_string(),
            timestamp: Utc::now(),
            details,
            next_action: if proceed {
                action_when_met
            } else {
                NextAction::Wait
            },
        }
    }

    fn failed_decision(account_id: i64, reason: String) -> DecisionResult {
        DecisionResult {
            should_proceed: false,
            reason,
            timestamp: Utc::now(),
            details: DecisionDetails {
                price_analysis: PriceAnalysisSnapshot::no_data(),
                account_id,
                stock_symbol: None,
                current_price: None,
            },
            next_action: NextAction::Wait,
        }
    }
}
