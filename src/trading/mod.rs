// src/trading/mod.rs
pub mod rules;
pub mod strategy;

pub use rules::{should_buy, should_sell};
pub use strategy::StrategyExecutor;
