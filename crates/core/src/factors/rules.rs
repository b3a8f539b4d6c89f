//! Factor rule table.
//!
//! Rules run in table order and each one emits at most one factor. The output
//! keeps generation order and is capped at [`MAX_FACTORS`].

use crate::constants::MAX_FACTORS;
use crate::indicators::IndicatorSet;

use super::{Bias, Factor, Impact};

/// Inputs every rule sees.
#[derive(Debug, Clone, Copy)]
pub struct FactorInput<'a> {
    /// Latest traded price. Non-positive prices disable price-relative rules.
    pub price: f64,
    pub indicators: &'a IndicatorSet,
}

impl FactorInput<'_> {
    fn price(&self) -> Option<f64> {
        (self.price.is_finite() && self.price > 0.0).then_some(self.price)
    }

    fn band_width(&self) -> Option<f64> {
        self.indicators.bollinger.and_then(|b| b.width())
    }
}

pub type FactorRule = fn(&FactorInput<'_>) -> Option<Factor>;

/// Ordered rule table: (name, rule).
pub const RULES: &[(&str, FactorRule)] = &[
    ("rsi_overbought", rsi_overbought),
    ("rsi_oversold", rsi_oversold),
    ("uptrend", uptrend),
    ("downtrend", downtrend),
    ("high_volatility", high_volatility),
    ("volatility_squeeze", volatility_squeeze),
    ("macd_momentum", macd_momentum),
    ("band_breakout", band_breakout),
];

pub fn generate_factors(price: f64, indicators: &IndicatorSet) -> Vec<Factor> {
    let input = FactorInput { price, indicators };
    RULES
        .iter()
        .filter_map(|(_, rule)| rule(&input))
        .take(MAX_FACTORS)
        .collect()
}

// =============================================================================
// Momentum
// =============================================================================

fn rsi_overbought(input: &FactorInput<'_>) -> Option<Factor> {
    let rsi = input.indicators.rsi.filter(|r| *r > 70.0)?;
    let impact = if rsi > 80.0 {
        Impact::High
    } else if rsi > 75.0 {
        Impact::Medium
    } else {
        Impact::Low
    };
    Some(Factor::new(
        "Overbought",
        Bias::Bearish,
        impact,
        (58.0 + (rsi - 70.0) * 1.2).min(94.0),
        format!("RSI at {:.1} shows stretched buying pressure", rsi),
    ))
}

fn rsi_oversold(input: &FactorInput<'_>) -> Option<Factor> {
    let rsi = input.indicators.rsi.filter(|r| *r < 30.0)?;
    let impact = if rsi < 20.0 {
        Impact::High
    } else if rsi < 25.0 {
        Impact::Medium
    } else {
        Impact::Low
    };
    Some(Factor::new(
        "Oversold",
        Bias::Bullish,
        impact,
        (58.0 + (30.0 - rsi) * 1.2).min(94.0),
        format!("RSI at {:.1} shows exhausted selling pressure", rsi),
    ))
}

// =============================================================================
// Trend
// =============================================================================

/// `None` when the long average is not a usable divisor.
fn trend_strength(sma_50: f64, sma_200: f64) -> Option<(Impact, f64)> {
    if !(sma_200.is_finite() && sma_200 > 0.0) {
        return None;
    }
    let spread = ((sma_50 - sma_200) / sma_200 * 100.0).abs();
    let impact = if spread > 10.0 {
        Impact::High
    } else {
        Impact::Medium
    };
    Some((impact, (65.0 + spread).min(90.0)))
}

fn uptrend(input: &FactorInput<'_>) -> Option<Factor> {
    let price = input.price()?;
    let sma_50 = input.indicators.sma_50?;
    let sma_200 = input.indicators.sma_200?;
    if !(price > sma_50 && sma_50 > sma_200) {
        return None;
    }
    let (impact, confidence) = trend_strength(sma_50, sma_200)?;
    Some(Factor::new(
        "Uptrend confirmed",
        Bias::Bullish,
        impact,
        confidence,
        "Price is above the 50-day average, which is above the 200-day average",
    ))
}

fn downtrend(input: &FactorInput<'_>) -> Option<Factor> {
    let price = input.price()?;
    let sma_50 = input.indicators.sma_50?;
    let sma_200 = input.indicators.sma_200?;
    if !(price < sma_50 && sma_50 < sma_200) {
        return None;
    }
    let (impact, confidence) = trend_strength(sma_50, sma_200)?;
    Some(Factor::new(
        "Trend headwinds",
        Bias::Bearish,
        impact,
        confidence,
        "Price is below the 50-day average, which is below the 200-day average",
    ))
}

// =============================================================================
// Volatility
// =============================================================================

fn high_volatility(input: &FactorInput<'_>) -> Option<Factor> {
    let width = input.band_width().filter(|w| *w > 8.0)?;
    let impact = if width > 12.0 {
        Impact::High
    } else {
        Impact::Medium
    };
    Some(Factor::new(
        "High volatility risk",
        Bias::Bearish,
        impact,
        (55.0 + (width - 8.0) * 2.0).min(85.0),
        format!("Bollinger width of {:.1}% signals wide price swings", width),
    ))
}

fn volatility_squeeze(input: &FactorInput<'_>) -> Option<Factor> {
    let width = input.band_width().filter(|w| *w < 3.0)?;
    Some(Factor::new(
        "Volatility squeeze",
        Bias::Neutral,
        Impact::Low,
        (55.0 + (3.0 - width) * 5.0).min(80.0),
        format!(
            "Bollinger width of {:.1}% often precedes a directional move",
            width
        ),
    ))
}

// =============================================================================
// Secondary signals
// =============================================================================

fn macd_momentum(input: &FactorInput<'_>) -> Option<Factor> {
    let macd = input.indicators.macd?;
    if macd.histogram == 0.0 {
        return None;
    }
    let bullish = macd.histogram > 0.0;
    // Histogram agreeing with the MACD line side of zero.
    let aligned = (macd.macd > 0.0) == bullish;
    let confidence = if aligned { 65.0 } else { 55.0 };

    let (title, bias, description) = if bullish {
        (
            "Positive momentum",
            Bias::Bullish,
            "MACD is above its signal line",
        )
    } else {
        (
            "Fading momentum",
            Bias::Bearish,
            "MACD is below its signal line",
        )
    };
    Some(Factor::new(title, bias, Impact::Low, confidence, description))
}

fn band_breakout(input: &FactorInput<'_>) -> Option<Factor> {
    let price = input.price()?;
    let bands = input.indicators.bollinger?;
    if price > bands.upper {
        Some(Factor::new(
            "Stretched above upper band",
            Bias::Bearish,
            Impact::Medium,
            60.0,
            format!("Price {:.2} is above the upper band at {:.2}", price, bands.upper),
        ))
    } else if price < bands.lower {
        Some(Factor::new(
            "Stretched below lower band",
            Bias::Bullish,
            Impact::Medium,
            60.0,
            format!("Price {:.2} is below the lower band at {:.2}", price, bands.lower),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{BollingerBands, MacdValue};

    fn set() -> IndicatorSet {
        IndicatorSet::default()
    }

    fn titles(factors: &[Factor]) -> Vec<&str> {
        factors.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn empty_indicators_yield_no_factors() {
        assert!(generate_factors(100.0, &set()).is_empty());
    }

    #[test]
    fn overbought_impact_and_confidence() {
        let mk = |rsi| IndicatorSet {
            rsi: Some(rsi),
            ..set()
        };

        let f = &generate_factors(100.0, &mk(72.0))[0];
        assert_eq!(f.title, "Overbought");
        assert_eq!(f.bias, Bias::Bearish);
        assert_eq!(f.impact, Impact::Low);
        assert!((f.confidence - 60.4).abs() < 1e-9);

        assert_eq!(generate_factors(100.0, &mk(78.0))[0].impact, Impact::Medium);

        let f = &generate_factors(100.0, &mk(99.0))[0];
        assert_eq!(f.impact, Impact::High);
        assert!((f.confidence - 92.8).abs() < 1e-9);

        let f = &generate_factors(100.0, &mk(100.0))[0];
        assert!((f.confidence - 94.0).abs() < 1e-9);
        assert!(f.confidence <= 94.0);

        assert!(generate_factors(100.0, &mk(70.0)).is_empty());
    }

    #[test]
    fn oversold_is_symmetric() {
        let indicators = IndicatorSet {
            rsi: Some(15.0),
            ..set()
        };
        let f = &generate_factors(100.0, &indicators)[0];
        assert_eq!(f.title, "Oversold");
        assert_eq!(f.bias, Bias::Bullish);
        assert_eq!(f.impact, Impact::High);
        assert!((f.confidence - 76.0).abs() < 1e-9);
    }

    #[test]
    fn trend_rules_require_strict_ordering() {
        let indicators = IndicatorSet {
            sma_50: Some(105.0),
            sma_200: Some(100.0),
            ..set()
        };
        assert_eq!(
            titles(&generate_factors(110.0, &indicators)),
            vec!["Uptrend confirmed"]
        );
        assert!(generate_factors(104.0, &indicators).is_empty());

        let indicators = IndicatorSet {
            sma_50: Some(95.0),
            sma_200: Some(100.0),
            ..set()
        };
        let factors = generate_factors(90.0, &indicators);
        assert_eq!(titles(&factors), vec!["Trend headwinds"]);
        assert_eq!(factors[0].bias, Bias::Bearish);
    }

    #[test]
    fn trend_rules_skip_non_positive_long_average() {
        for sma_200 in [0.0, -5.0, f64::NAN] {
            let indicators = IndicatorSet {
                sma_50: Some(50.0),
                sma_200: Some(sma_200),
                ..set()
            };
            assert!(generate_factors(60.0, &indicators).is_empty());
        }
    }

    #[test]
    fn price_rules_skip_unavailable_price() {
        let indicators = IndicatorSet {
            sma_50: Some(95.0),
            sma_200: Some(100.0),
            ..set()
        };
        assert!(generate_factors(0.0, &indicators).is_empty());
    }

    #[test]
    fn band_width_rules() {
        let wide = IndicatorSet {
            bollinger: Some(BollingerBands {
                upper: 110.0,
                middle: 100.0,
                lower: 90.0,
            }),
            ..set()
        };
        let factors = generate_factors(100.0, &wide);
        assert_eq!(titles(&factors), vec!["High volatility risk"]);
        assert_eq!(factors[0].impact, Impact::High);

        let tight = IndicatorSet {
            bollinger: Some(BollingerBands {
                upper: 101.0,
                middle: 100.0,
                lower: 99.0,
            }),
            ..set()
        };
        let factors = generate_factors(100.0, &tight);
        assert_eq!(titles(&factors), vec!["Volatility squeeze"]);
        assert_eq!(factors[0].bias, Bias::Neutral);
    }

    #[test]
    fn breakout_above_upper_band() {
        let indicators = IndicatorSet {
            bollinger: Some(BollingerBands {
                upper: 102.0,
                middle: 100.0,
                lower: 98.0,
            }),
            ..set()
        };
        let factors = generate_factors(103.0, &indicators);
        assert_eq!(titles(&factors), vec!["Stretched above upper band"]);
    }

    #[test]
    fn macd_momentum_direction() {
        let indicators = IndicatorSet {
            macd: Some(MacdValue {
                macd: 1.5,
                signal: 1.0,
                histogram: 0.5,
            }),
            ..set()
        };
        let f = &generate_factors(100.0, &indicators)[0];
        assert_eq!(f.bias, Bias::Bullish);
        assert_eq!(f.confidence, 65.0);

        let indicators = IndicatorSet {
            macd: Some(MacdValue {
                macd: 1.0,
                signal: 1.5,
                histogram: -0.5,
            }),
            ..set()
        };
        let f = &generate_factors(100.0, &indicators)[0];
        assert_eq!(f.bias, Bias::Bearish);
        assert_eq!(f.confidence, 55.0);
    }

    #[test]
    fn output_keeps_table_order() {
        let indicators = IndicatorSet {
            sma_20: Some(120.0),
            sma_50: Some(110.0),
            sma_200: Some(100.0),
            rsi: Some(85.0),
            macd: Some(MacdValue {
                macd: 2.0,
                signal: 1.0,
                histogram: 1.0,
            }),
            bollinger: Some(BollingerBands {
                upper: 130.0,
                middle: 120.0,
                lower: 110.0,
            }),
        };
        let factors = generate_factors(140.0, &indicators);
        assert_eq!(
            titles(&factors),
            vec![
                "Overbought",
                "Uptrend confirmed",
                "High volatility risk",
                "Positive momentum",
                "Stretched above upper band",
            ]
        );
        assert!(factors.len() <= MAX_FACTORS);
    }
}
