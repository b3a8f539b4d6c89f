use serde::{Deserialize, Serialize};

use marketpulse_market_data::{closes, PriceBar};

use super::{
    bollinger, macd, rsi, sma, DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD,
    DEFAULT_FAST, DEFAULT_RSI_PERIOD, DEFAULT_SIGNAL, DEFAULT_SLOW,
};

/// One MACD point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// One Bollinger Bands point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    /// Band width as a percentage of the middle band.
    pub fn width(&self) -> Option<f64> {
        if self.middle == 0.0 {
            None
        } else {
            Some((self.upper - self.lower) / self.middle * 100.0)
        }
    }
}

/// Latest value of every standard indicator.
///
/// A field is `None` when the history is shorter than that indicator's
/// window, and is left out of the serialized form. Consumers render it as
/// "not available".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBands>,
}

fn latest<T: Copy>(series: Vec<Option<T>>) -> Option<T> {
    series.last().copied().flatten()
}

impl IndicatorSet {
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        Self::from_closes(&closes(bars))
    }

    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            sma_20: latest(sma(closes, 20)),
            sma_50: latest(sma(closes, 50)),
            sma_200: latest(sma(closes, 200)),
            rsi: latest(rsi(closes, DEFAULT_RSI_PERIOD)),
            macd: latest(macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)),
            bollinger: latest(bollinger(
                closes,
                DEFAULT_BOLLINGER_PERIOD,
                DEFAULT_BOLLINGER_MULTIPLIER,
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
