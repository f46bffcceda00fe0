use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::indicators::{
    bollinger_bands, price_changes, relative_strength_index, simple_moving_average, BollingerBands,
};
use crate::analysis::{
    BOLLINGER_PERIOD, BOLLINGER_STD_DEV, LONG_MA_PERIOD, MA_PERIODS, MEDIUM_MA_PERIOD,
    MIN_DATA_POINTS, RSI_MIN_POINTS, RSI_OVERBOUGHT, RSI_OVERSOLD, RSI_PERIOD, SHORT_MA_PERIOD,
};

/// Categorical reading of the RSI oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSignal {
    Oversold,
    Overbought,
    Neutral,
}

/// Categorical reading of price against the Bollinger Bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BollingerSignal {
    Overbought,
    Oversold,
    Neutral,
}

/// Short-vs-long moving-average relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossoverSignal {
    Bullish,
    Bearish,
}

/// Signals derived from the technical indicators. A `None` entry means the
/// underlying indicator could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SignalSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_crossover: Option<CrossoverSignal>,
}

/// Aggregate indicator output for one price series at one point in time.
/// Built fresh per decision request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAnalysisSnapshot {
    pub has_data: bool,
    pub latest_price: Option<f64>,
    /// Moving averages for the periods the series could satisfy.
    pub moving_averages: BTreeMap<usize, f64>,
    pub rsi: Option<f64>,
    pub bollinger_bands: Option<BollingerBands>,
    pub is_uptrend: Option<bool>,
    pub price_changes: BTreeMap<String, f64>,
    pub signals: SignalSet,
}

impl PriceAnalysisSnapshot {
    /// Snapshot for a series too short to analyze: nothing computed.
    pub fn no_data() -> Self {
        Self {
            has_data: false,
            latest_price: None,
            moving_averages: BTreeMap::new(),
            rsi: None,
            bollinger_bands: None,
            is_uptrend: None,
            price_changes: BTreeMap::new(),
            signals: SignalSet::default(),
        }
    }

    pub fn short_ma(&self) -> Option<f64> {
        self.moving_averages.get(&SHORT_MA_PERIOD).copied()
    }

    pub fn long_ma(&self) -> Option<f64> {
        self.moving_averages.get(&LONG_MA_PERIOD).copied()
    }
}

/// Convert raw indicator values into categorical signals.
pub fn analyze_signals(
    rsi: Option<f64>,
    moving_averages: &BTreeMap<usize, f64>,
    bollinger: Option<BollingerBands>,
    latest_price: Option<f64>,
) -> SignalSet {
    let rsi_signal = rsi.map(|value| {
        if value < RSI_OVERSOLD {
            RsiSignal::Oversold
        } else if value > RSI_OVERBOUGHT {
            RsiSignal::Overbought
        } else {
            RsiSignal::Neutral
        }
    });

    let ma_crossover = match (
        moving_averages.get(&SHORT_MA_PERIOD),
        moving_averages.get(&LONG_MA_PERIOD),
    ) {
        (Some(short), Some(long)) => Some(if short > long {
            CrossoverSignal::Bullish
        } else {
            CrossoverSignal::Bearish
        }),
        _ => None,
    };

    let bollinger_signal = match (bollinger, latest_price) {
        (Some(bands), Some(price)) => Some(if price > bands.upper {
            BollingerSignal::Overbought
        } else if price < bands.lower {
            BollingerSignal::Oversold
        } else {
            BollingerSignal::Neutral
        }),
        _ => None,
    };

    SignalSet {
        rsi: rsi_signal,
        bollinger: bollinger_signal,
        ma_crossover,
    }
}

/// Comprehensive price analysis for trading decisions.
///
/// Series shorter than MIN_DATA_POINTS produce an empty no-data snapshot.
/// Pure: two calls on the same series yield identical snapshots.
pub fn get_price_analysis(close_prices: &[f64]) -> PriceAnalysisSnapshot {
    if close_prices.len() < MIN_DATA_POINTS {
        return PriceAnalysisSnapshot::no_data();
    }
    let Some(&latest_price) = close_prices.last() else {
        return PriceAnalysisSnapshot::no_data();
    };

    let moving_averages: BTreeMap<usize, f64> = MA_PERIODS
        .iter()
        .filter(|&&period| close_prices.len() >= period)
        .filter_map(|&period| {
            simple_moving_average(close_prices, period).map(|value| (period, value))
        })
        .collect();

    let rsi = if close_prices.len() >= RSI_MIN_POINTS {
        relative_strength_index(close_prices, RSI_PERIOD)
    } else {
        None
    };

    let bands = if close_prices.len() >= BOLLINGER_PERIOD {
        bollinger_bands(close_prices, BOLLINGER_PERIOD, BOLLINGER_STD_DEV)
    } else {
        None
    };

    let is_uptrend = match (
        moving_averages.get(&SHORT_MA_PERIOD),
        moving_averages.get(&LONG_MA_PERIOD),
    ) {
        (Some(short), Some(long)) => Some(short > long),
        _ => None,
    };

    let signals = analyze_signals(rsi, &moving_averages, bands, Some(latest_price));

    PriceAnalysisSnapshot {
        has_data: true,
        latest_price: Some(latest_price),
        moving_averages,
        rsi,
        bollinger_bands: bands,
        is_uptrend,
        price_changes: price_changes(close_prices),
        signals,
    }
}

/// Standalone uptrend check used outside full snapshot analysis.
///
/// Compares the 5-day MA against the 10-day MA; with only 5-9 points it
/// falls back to "last close above the 5-day MA".
pub fn is_price_trending_up(close_prices: &[f64]) -> bool {
    if close_prices.len() < MIN_DATA_POINTS {
        return false;
    }

    let Some(short_ma) = simple_moving_average(close_prices, SHORT_MA_PERIOD) else {
        return false;
    };

    if close_prices.len() >= MEDIUM_MA_PERIOD {
        match simple_moving_average(close_prices, MEDIUM_MA_PERIOD) {
            Some(medium_ma) => short_ma > medium_ma,
            None => false,
        }
    } else {
        close_prices[close_prices.len() - 1] > short_ma
    }
}
