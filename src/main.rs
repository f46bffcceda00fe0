// src/main.rs
// Demo runner: seeds the in-memory repositories with one account and a
// deterministic price series, then prints the decision and execution
// payloads as JSON.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use trade_engine::config::Config;
use trade_engine::domain::errors::AppResult;
use trade_engine::domain::models::{ServiceState, TradingAccount, TradingMode};
use trade_engine::domain::repository::AccountRepository;
use trade_engine::infrastructure::memory::{InMemoryAccountRepository, InMemoryMarketData};
use trade_engine::trading::strategy::StrategyExecutor;

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = Config::from_env()?;
    config.init_logging()?;

    log::info!("Starting trade_engine v{}", env!("CARGO_PKG_VERSION"));

    let market_data = Arc::new(InMemoryMarketData::new());
    let accounts = Arc::new(InMemoryAccountRepository::new());

    // A pullback after a long rise: uptrend intact, last close well below
    // the short moving average.
    let mut closes: Vec<f64> = (1..=40).map(|i| 100.0 + i as f64).collect();
    closes.extend([139.0, 137.0, 134.0, 130.0, 126.0]);
    market_data.set_closes("ACME", closes);

    accounts.insert_account(TradingAccount {
        id: 1,
        name: "ACME demo strategy".to_string(),
        stock_symbol: "ACME".to_string(),
        state: ServiceState::Active,
        mode: TradingMode::Buy,
        is_active: true,
        initial_balance: dec!(10000),
        current_balance: dec!(10000),
        minimum_balance: dec!(1000),
        allocation_percent: dec!(50),
        buy_threshold: dec!(3.0),
        sell_threshold: dec!(2.0),
        current_shares: 0,
        buy_count: 0,
        sell_count: 0,
        total_gain_loss: Decimal::ZERO,
    });

    let executor = StrategyExecutor::new(market_data, accounts.clone(), config.engine.clone());

    let decision = executor.check_buy_condition(1).await;
    println!("{}", serde_json::to_string_pretty(&decision)?);

    let result = executor.execute(1).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(account) = accounts.find_account(1).await? {
        log::info!(
            "Account {} now holds {} shares with balance {}",
            account.id,
            account.current_shares,
            account.current_balance
        );
    }

    Ok(())
}
