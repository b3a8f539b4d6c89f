//! Indicator engine.
//!
//! Pure functions over an ascending close series. Every series function
//! returns one output per input point so results line up positionally
//! with the bars they came from; points inside an indicator's warmup
//! window are `None`.
//!
//! - **Moving averages** (`moving_average.rs`) - SMA, EMA
//! - **RSI** (`rsi.rs`) - Wilder-smoothed momentum oscillator
//! - **MACD** (`macd.rs`) - Trend oscillator with signal and histogram
//! - **Bollinger** (`bollinger.rs`) - Rolling stddev and volatility bands
//! - **Model** (`indicators_model.rs`) - Latest-value `IndicatorSet`

mod bollinger;
mod indicators_model;
mod macd;
mod moving_average;
mod rsi;

pub use bollinger::{
    bollinger, rolling_stddev, DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD,
};
pub use indicators_model::{BollingerBands, IndicatorSet, MacdValue};
pub use macd::{macd, DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
pub use moving_average::{ema, sma};
pub use rsi::{rsi, DEFAULT_RSI_PERIOD};
