//! Composite health score.
//!
//! Four sub-scores of up to 25 points each are summed and rounded into a
//! 0-100 integer. A missing input contributes nothing to its sub-score.

use serde::{Deserialize, Serialize};

const SUB_SCORE_MAX: f64 = 25.0;
const HALF: f64 = SUB_SCORE_MAX / 2.0;

/// Fundamentals feeding the health score. Percentages are in percent units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub profit_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub one_year_return: Option<f64>,
    pub beta: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub total: u8,
    pub valuation: f64,
    pub profitability: f64,
    pub returns: f64,
    pub stability: f64,
}

/// Linear ramp clamped to [0, 1]. `value` at `zero` maps to 0, at `full` to 1.
fn ramp(value: f64, zero: f64, full: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    ((value - zero) / (full - zero)).clamp(0.0, 1.0)
}

impl HealthScore {
    pub fn compute(f: &Fundamentals) -> Self {
        let valuation = Self::valuation(f);
        let profitability = Self::profitability(f);
        let returns = Self::returns(f);
        let stability = Self::stability(f);

        let sum = valuation + profitability + returns + stability;
        Self {
            total: sum.round().clamp(0.0, 100.0) as u8,
            valuation,
            profitability,
            returns,
            stability,
        }
    }

    /// Full marks at P/E <= 15, nothing at 50 or above or for negative earnings.
    fn valuation(f: &Fundamentals) -> f64 {
        match f.pe_ratio {
            Some(pe) if pe > 0.0 => SUB_SCORE_MAX * ramp(pe, 50.0, 15.0),
            _ => 0.0,
        }
    }

    /// Half from net margin (full at 30%), half from ROE (full at 25%).
    fn profitability(f: &Fundamentals) -> f64 {
        let margin = f.profit_margin.map_or(0.0, |m| HALF * ramp(m, 0.0, 30.0));
        let roe = f.return_on_equity.map_or(0.0, |r| HALF * ramp(r, 0.0, 25.0));
        margin + roe
    }

    /// Nothing at -25% over a year, full marks at +25%.
    fn returns(f: &Fundamentals) -> f64 {
        f.one_year_return
            .map_or(0.0, |r| SUB_SCORE_MAX * ramp(r, -25.0, 25.0))
    }

    /// Half from beta (full at <= 1, nothing at 2.5), half from D/E (full at 0,
    /// nothing at 3). Negative D/E means negative equity and scores nothing.
    fn stability(f: &Fundamentals) -> f64 {
        let beta = f.beta.map_or(0.0, |b| HALF * ramp(b.abs(), 2.5, 1.0));
        let leverage = match f.debt_to_equity {
            Some(de) if de >= 0.0 => HALF * ramp(de, 3.0, 0.0),
            _ => 0.0,
        };
        beta + leverage
    }
}
