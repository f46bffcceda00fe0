use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::{MA_PERIODS, PRICE_CHANGE_PERIODS};

/// Simple Moving Average (SMA) over the last `period` prices.
///
/// Prices run oldest to newest. Returns `None` when the series is shorter
/// than `period`.
pub fn simple_moving_average(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Moving averages for each requested period. Periods the series cannot
/// satisfy map to `None`.
pub fn moving_averages(prices: &[f64], periods: &[usize]) -> BTreeMap<usize, Option<f64>> {
    let mut result = BTreeMap::new();
    for &period in periods {
        result.insert(period, simple_moving_average(prices, period));
    }
    result
}

/// Moving averages for the default period set {5, 10, 20, 50, 200}.
pub fn default_moving_averages(prices: &[f64]) -> BTreeMap<usize, Option<f64>> {
    moving_averages(prices, &MA_PERIODS)
}

/// Relative Strength Index (RSI).
///
/// Gains and losses are averaged plainly over the last `period` deltas.
/// Returns `None` when fewer than `period + 1` prices are available;
/// otherwise the value is in [0, 100].
pub fn relative_strength_index(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let avg_gain = gains[gains.len() - period..].iter().sum::<f64>() / period as f64;
    let avg_loss = losses[losses.len() - period..].iter().sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// Volatility bands around a moving average: SMA plus/minus `num_std`
/// population standard deviations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the last `period` prices, or `None` when the
/// series is too short.
pub fn bollinger_bands(prices: &[f64], period: usize, num_std: f64) -> Option<BollingerBands> {
    let middle = simple_moving_average(prices, period)?;

    let window = &prices[prices.len() - period..];
    let variance = window.iter().map(|&p| (p - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    Some(BollingerBands {
        upper: middle + num_std * std_dev,
        middle,
        lower: middle - num_std * std_dev,
    })
}

/// Percentage price change over each lookback period {1, 5, 10, 30, 90},
/// keyed `"{period}_day"`. Periods the series cannot cover, and reference
/// prices of zero, are omitted.
pub fn price_changes(prices: &[f64]) -> BTreeMap<String, f64> {
    let mut changes = BTreeMap::new();
    let Some(&latest) = prices.last() else {
        return changes;
    };

    for period in PRICE_CHANGE_PERIODS {
        if prices.len() > period {
            let reference = prices[prices.len() - 1 - period];
            if reference != 0.0 {
                let change = (latest - reference) / reference * 100.0;
                changes.insert(format!("{}_day", period), change);
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_is_absent_below_period() {
        let prices = [10.0, 11.0, 12.0];
        assert_eq!(simple_moving_average(&prices, 4), None);
        assert_eq!(simple_moving_average(&prices, 0), None);
    }

    #[test]
    fn sma_averages_last_window() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(simple_moving_average(&prices, 3), Some(5.0));
        assert_eq!(simple_moving_average(&prices, 6), Some(3.5));
    }

    #[test]
    fn moving_averages_mark_unsatisfiable_periods() {
        let prices: Vec<f64> = (1..=10).map(f64::from).collect();
        let mas = default_moving_averages(&prices);

        assert_eq!(mas[&5], Some(8.0));
        assert_eq!(mas[&10], Some(5.5));
        assert_eq!(mas[&20], None);
        assert_eq!(mas[&50], None);
        assert_eq!(mas[&200], None);
    }

    #[test]
    fn rsi_requires_period_plus_one_points() {
        let prices: Vec<f64> = (1..=14).map(f64::from).collect();
        assert_eq!(relative_strength_index(&prices, 14), None);
    }

    #[test]
    fn rsi_saturates_at_extremes() {
        // Monotonic increase: no losses at all
        let rising: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(relative_strength_index(&rising, 14), Some(100.0));

        // Monotonic decrease: no gains at all
        let falling: Vec<f64> = (1..=20).rev().map(f64::from).collect();
        assert_eq!(relative_strength_index(&falling, 14), Some(0.0));
    }

    #[test]
    fn rsi_reflects_net_upward_drift() {
        let prices = [
            100.0, 102.0, 101.0, 105.0, 107.0, 106.0, 108.0, 110.0, 109.0, 111.0, 113.0, 112.0,
            114.0, 116.0, 115.0,
        ];
        let rsi = relative_strength_index(&prices, 14).unwrap();
        assert!(rsi > 50.0 && rsi < 100.0, "rsi = {}", rsi);
    }

    #[test]
    fn rsi_stays_in_range() {
        let mixed = [50.0, 48.0, 53.0, 51.0, 55.0, 52.0, 56.0, 54.0, 58.0, 55.0, 59.0, 57.0, 61.0, 58.0, 62.0];
        let rsi = relative_strength_index(&mixed, 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi));
    }

    #[test]
    fn bollinger_absent_below_period() {
        let prices: Vec<f64> = (1..=19).map(f64::from).collect();
        assert!(bollinger_bands(&prices, 20, 2.0).is_none());
    }

    #[test]
    fn bollinger_bands_are_ordered_around_sma() {
        let prices: Vec<f64> = (1..=25).map(f64::from).collect();
        let bands = bollinger_bands(&prices, 20, 2.0).unwrap();

        assert!(bands.upper >= bands.middle);
        assert!(bands.middle >= bands.lower);
        // Middle band is the 20-period SMA of 6..=25
        assert!((bands.middle - 15.5).abs() < 1e-9);
    }

    #[test]
    fn bollinger_bands_collapse_for_constant_series() {
        let prices = vec![42.0; 20];
        let bands = bollinger_bands(&prices, 20, 2.0).unwrap();
        assert_eq!(bands.upper, 42.0);
        assert_eq!(bands.middle, 42.0);
        assert_eq!(bands.lower, 42.0);
    }

    #[test]
    fn price_changes_cover_satisfiable_periods_only() {
        let prices: Vec<f64> = (1..=11).map(f64::from).collect();
        let changes = price_changes(&prices);

        // 1-day: (11 - 10) / 10, 5-day: (11 - 6) / 6, 10-day: (11 - 1) / 1
        assert!((changes["1_day"] - 10.0).abs() < 1e-9);
        assert!((changes["5_day"] - 83.333333333).abs() < 1e-6);
        assert!((changes["10_day"] - 1000.0).abs() < 1e-9);
        assert!(!changes.contains_key("30_day"));
        assert!(!changes.contains_key("90_day"));
    }

    #[test]
    fn price_changes_skip_zero_reference_prices() {
        let prices = [0.0, 5.0];
        let changes = price_changes(&prices);
        assert!(changes.is_empty());
    }
}
