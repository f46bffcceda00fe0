// src/trading/rules.rs
// Pure buy/sell predicates over a price-analysis snapshot

use rust_decimal::prelude::ToPrimitive;

use crate::analysis::signals::{BollingerSignal, CrossoverSignal, PriceAnalysisSnapshot, RsiSignal};
use crate::domain::models::TradingAccount;

/// Whether a buy should be made for this account right now.
///
/// Requires the account's buy gate to pass, then any single trigger
/// suffices: RSI oversold, price under the lower Bollinger band, or an
/// uptrend where the price sits far enough below the short MA. The
/// triggers are OR-combined on purpose, favoring responsiveness over
/// consensus.
pub fn should_buy(
    account: &TradingAccount,
    snapshot: &PriceAnalysisSnapshot,
    current_price: f64,
) -> bool {
    if !account.can_buy() || !snapshot.has_data {
        return false;
    }

    let rsi_buy_signal = snapshot.signals.rsi == Some(RsiSignal::Oversold);
    let bollinger_buy_signal = snapshot.signals.bollinger == Some(BollingerSignal::Oversold);

    let ma_buy_signal = match (snapshot.is_uptrend, snapshot.short_ma()) {
        (Some(true), Some(short_ma)) if short_ma > 0.0 => {
            let percent_below_ma = (short_ma - current_price) / short_ma * 100.0;
            match account.buy_threshold.to_f64() {
                Some(threshold) => percent_below_ma >= threshold,
                None => false,
            }
        }
        _ => false,
    };

    rsi_buy_signal || bollinger_buy_signal || ma_buy_signal
}

/// Whether the account's position should be liquidated right now.
///
/// Requires the sell gate to pass, then any single trigger suffices: RSI
/// overbought, price over the upper Bollinger band, or a bearish MA
/// crossover.
pub fn should_sell(account: &TradingAccount, snapshot: &PriceAnalysisSnapshot) -> bool {
    if !account.can_sell() || !snapshot.has_data {
        return false;
    }

    let rsi_sell_signal = snapshot.signals.rsi == Some(RsiSignal::Overbought);
    let bollinger_sell_signal = snapshot.signals.bollinger == Some(BollingerSignal::Overbought);
    let ma_crossover_sell_signal = snapshot.signals.ma_crossover == Some(CrossoverSignal::Bearish);

    rsi_sell_signal || bollinger_sell_signal || ma_crossover_sell_signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::signals::SignalSet;
    use crate::domain::models::{ServiceState, TradingMode};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn buy_account() -> TradingAccount {
        TradingAccount {
            id: 1,
            name: "rules".to_string(),
            stock_symbol: "ACME".to_string(),
            state: ServiceState::Active,
            mode: TradingMode::Buy,
            is_active: true,
            initial_balance: dec!(1000),
            current_balance: dec!(1000),
            minimum_balance: dec!(500),
            allocation_percent: dec!(50),
            buy_threshold: dec!(3.0),
            sell_threshold: dec!(2.0),
            current_shares: 0,
            buy_count: 0,
            sell_count: 0,
            total_gain_loss: Decimal::ZERO,
        }
    }

    fn sell_account() -> TradingAccount {
        let mut account = buy_account();
        account.mode = TradingMode::Sell;
        account.current_shares = 10;
        account
    }

    fn snapshot_with(signals: SignalSet) -> PriceAnalysisSnapshot {
        PriceAnalysisSnapshot {
            has_data: true,
            latest_price: Some(100.0),
            moving_averages: BTreeMap::new(),
            rsi: None,
            bollinger_bands: None,
            is_uptrend: None,
            price_changes: BTreeMap::new(),
            signals,
        }
    }

    #[test]
    fn any_single_buy_trigger_suffices() {
        let account = buy_account();

        let rsi_snapshot = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Oversold),
            ..SignalSet::default()
        });
        assert!(should_buy(&account, &rsi_snapshot, 100.0));

        let bollinger_snapshot = snapshot_with(SignalSet {
            bollinger: Some(BollingerSignal::Oversold),
            ..SignalSet::default()
        });
        assert!(should_buy(&account, &bollinger_snapshot, 100.0));

        let neutral = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Neutral),
            bollinger: Some(BollingerSignal::Neutral),
            ..SignalSet::default()
        });
        assert!(!should_buy(&account, &neutral, 100.0));
    }

    #[test]
    fn dip_in_uptrend_triggers_buy_at_threshold() {
        let account = buy_account();

        let mut snapshot = snapshot_with(SignalSet::default());
        snapshot.is_uptrend = Some(true);
        snapshot.moving_averages.insert(5, 100.0);

        // 3% below the 5-day MA meets the 3.0 threshold exactly
        assert!(should_buy(&account, &snapshot, 97.0));
        // 2% below does not
        assert!(!should_buy(&account, &snapshot, 98.0));

        // Same dip without the uptrend is not a trigger
        snapshot.is_uptrend = Some(false);
        assert!(!should_buy(&account, &snapshot, 97.0));
    }

    #[test]
    fn buy_gate_blocks_regardless_of_signals() {
        let oversold = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Oversold),
            ..SignalSet::default()
        });

        let mut wrong_mode = buy_account();
        wrong_mode.mode = TradingMode::Sell;
        assert!(!should_buy(&wrong_mode, &oversold, 100.0));

        let mut inactive = buy_account();
        inactive.state = ServiceState::Paused;
        assert!(!should_buy(&inactive, &oversold, 100.0));

        let mut at_reserve = buy_account();
        at_reserve.current_balance = at_reserve.minimum_balance;
        assert!(!should_buy(&at_reserve, &oversold, 100.0));
    }

    #[test]
    fn no_data_snapshot_never_buys() {
        let account = buy_account();
        assert!(!should_buy(&account, &PriceAnalysisSnapshot::no_data(), 100.0));
    }

    #[test]
    fn any_single_sell_trigger_suffices() {
        let account = sell_account();

        let rsi = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Overbought),
            ..SignalSet::default()
        });
        assert!(should_sell(&account, &rsi));

        let bollinger = snapshot_with(SignalSet {
            bollinger: Some(BollingerSignal::Overbought),
            ..SignalSet::default()
        });
        assert!(should_sell(&account, &bollinger));

        let crossover = snapshot_with(SignalSet {
            ma_crossover: Some(CrossoverSignal::Bearish),
            ..SignalSet::default()
        });
        assert!(should_sell(&account, &crossover));

        let neutral = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Neutral),
            bollinger: Some(BollingerSignal::Neutral),
            ma_crossover: Some(CrossoverSignal::Bullish),
        });
        assert!(!should_sell(&account, &neutral));
    }

    #[test]
    fn sell_gate_blocks_without_shares() {
        let overbought = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Overbought),
            ..SignalSet::default()
        });

        let mut empty_position = sell_account();
        empty_position.current_shares = 0;
        assert!(!should_sell(&empty_position, &overbought));
    }

    #[test]
    fn mode_gate_makes_buy_and_sell_mutually_exclusive() {
        // A snapshot that would trigger both predicates on its own
        let mut snapshot = snapshot_with(SignalSet {
            rsi: Some(RsiSignal::Oversold),
            ma_crossover: Some(CrossoverSignal::Bearish),
            ..SignalSet::default()
        });
        snapshot.is_uptrend = Some(true);

        let buyer = buy_account();
        let mut seller = sell_account();
        seller.current_balance = buyer.current_balance;

        assert!(should_buy(&buyer, &snapshot, 100.0));
        assert!(!should_sell(&buyer, &snapshot));

        assert!(should_sell(&seller, &snapshot));
        assert!(!should_buy(&seller, &snapshot, 100.0));
    }
}
