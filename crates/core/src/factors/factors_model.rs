//! Factor domain models.

use serde::{Deserialize, Serialize};

/// Direction a factor pushes the outlook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

/// How strongly a factor weighs.
///
/// Ordered from lowest to highest: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Impact {
    Low,
    Medium,
    High,
}

/// One qualitative observation derived from the indicator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Factor {
    pub title: String,
    pub bias: Bias,
    pub impact: Impact,
    /// Always within 0-100.
    pub confidence: f64,
    pub description: String,
}

impl Factor {
    pub fn new(
        title: impl Into<String>,
        bias: Bias,
        impact: Impact,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            bias,
            impact,
            confidence: clamp_confidence(confidence),
            description: description.into(),
        }
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        let f = Factor::new("x", Bias::Neutral, Impact::Low, 140.0, "");
        assert_eq!(f.confidence, 100.0);
        let f = Factor::new("x", Bias::Neutral, Impact::Low, -3.0, "");
        assert_eq!(f.confidence, 0.0);
        let f = Factor::new("x", Bias::Neutral, Impact::Low, f64::NAN, "");
        assert_eq!(f.confidence, 0.0);
    }

    #[test]
    fn serializes_enums_upper_case() {
        let f = Factor::new("Overbought", Bias::Bearish, Impact::High, 70.0, "d");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["bias"], "BEARISH");
        assert_eq!(json["impact"], "HIGH");
    }
}
