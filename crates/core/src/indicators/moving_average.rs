//! Simple and exponential moving averages.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]); undefined for the first n-1 points.
//! EMA(n): seeded with the first close, k = 2/(n+1),
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).

/// Simple moving average over `period` trailing closes.
pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut sum = 0.0;

    for (i, close) in closes.iter().enumerate() {
        sum += close;
        if i >= period {
            sum -= closes[i - period];
        }

        if i + 1 >= period {
            values.push(Some(sum / period as f64));
        } else {
            values.push(None);
        }
    }

    values
}

/// Exponential moving average seeded with the first close.
///
/// Defined at every point. Returns an empty series when `period` is zero.
pub fn ema(closes: &[f64], period: usize) -> Vec<f64> {
    let Some(&seed) = closes.first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(closes.len());
    let mut prev = seed;
    values.push(seed);

    for close in &closes[1..] {
        prev = close * k + prev * (1.0 - k);
        values.push(prev);
    }

    values
}
