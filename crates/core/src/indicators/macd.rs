//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD line, seeded at the first emitted point
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: points before index `slow` are excluded, so the first value needs
//! slow+1 closes.

use super::indicators_model::MacdValue;
use super::moving_average::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<Option<MacdValue>> {
    let mut values = vec![None; closes.len()];
    if fast == 0 || slow == 0 || signal_period == 0 || closes.len() <= slow {
        return values;
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .skip(slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal_period);

    for (i, (macd, signal)) in line.iter().zip(&signal).enumerate() {
        values[slow + i] = Some(MacdValue {
            macd: *macd,
            signal: *signal,
            histogram: macd - signal,
        });
    }

    values
}
