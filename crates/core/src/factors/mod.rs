//! Qualitative factors and the composite health score.
//!
//! - **Model** (`factors_model.rs`) - `Factor`, `Bias`, `Impact`
//! - **Rules** (`rules.rs`) - Ordered rule table turning indicators into factors
//! - **Health score** (`health_score.rs`) - Bounded 0-100 score from fundamentals

mod factors_model;
mod health_score;
mod rules;

pub use factors_model::{Bias, Factor, Impact};
pub use health_score::{Fundamentals, HealthScore};
pub use rules::{generate_factors, FactorInput, FactorRule, RULES};
