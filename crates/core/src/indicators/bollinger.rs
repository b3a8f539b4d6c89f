//! Rolling standard deviation and Bollinger Bands.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / n)
//! Bands = SMA(n) +/- k * STDDEV(n) over the same trailing window.
//! Warmup: first (n-1) points are undefined.

use super::indicators_model::BollingerBands;
use super::moving_average::sma;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

pub fn rolling_stddev(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    sma(closes, period)
        .into_iter()
        .enumerate()
        .map(|(i, mean)| {
            let mean = mean?;
            let window = &closes[i + 1 - period..=i];
            let variance = window
                .iter()
                .map(|c| {
                    let diff = c - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            Some(variance.sqrt())
        })
        .collect()
}

pub fn bollinger(closes: &[f64], period: usize, multiplier: f64) -> Vec<Option<BollingerBands>> {
    sma(closes, period)
        .into_iter()
        .zip(rolling_stddev(closes, period))
        .map(|(middle, stddev)| {
            let (middle, stddev) = (middle?, stddev?);
            Some(BollingerBands {
                upper: middle + multiplier * stddev,
                middle,
                lower: middle - multiplier * stddev,
            })
        })
        .collect()
}
