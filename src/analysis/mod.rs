// src/analysis/mod.rs
pub mod indicators;
pub mod signals;

pub use indicators::BollingerBands;
pub use signals::{
    get_price_analysis, BollingerSignal, CrossoverSignal, PriceAnalysisSnapshot, RsiSignal,
    SignalSet,
};

/// Minimum closing prices required before any analysis is attempted.
pub const MIN_DATA_POINTS: usize = 5;

// Moving-average periods
pub const SHORT_MA_PERIOD: usize = 5;
pub const MEDIUM_MA_PERIOD: usize = 10;
pub const LONG_MA_PERIOD: usize = 20;
pub const EXTENDED_MA_PERIOD: usize = 50;
pub const MAX_MA_PERIOD: usize = 200;

// RSI
pub const RSI_PERIOD: usize = 14;
pub const RSI_MIN_POINTS: usize = 15;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

// Bollinger Bands
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;

/// Lookback periods (in days) for percentage price changes.
pub const PRICE_CHANGE_PERIODS: [usize; 5] = [1, 5, 10, 30, 90];

/// Default period set for multi-period moving averages.
pub const MA_PERIODS: [usize; 5] = [
    SHORT_MA_PERIOD,
    MEDIUM_MA_PERIOD,
    LONG_MA_PERIOD,
    EXTENDED_MA_PERIOD,
    MAX_MA_PERIOD,
];
