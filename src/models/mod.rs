//! Simulated ML engines and their blend
//!
//! Neither engine is a fitted estimator. Both are fixed weighted-feature
//! formulas that keep per-feature contributions for explanation.

pub mod blender;
pub mod isolation_forest;
pub mod lightgbm;

pub use blender::{blend, MlBlend};
pub use isolation_forest::score_anomaly;
pub use lightgbm::score_fraud_probability;

use serde::{Deserialize, Serialize};

/// Which simulated engine produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    IsolationForest,
    LightGbm,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::IsolationForest => write!(f, "Isolation Forest"),
            ModelKind::LightGbm => write!(f, "LightGBM"),
        }
    }
}

/// A named feature's share of a model score, in score points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub feature: String,
    pub value: f64,
}

impl Contribution {
    pub fn new(feature: &str, value: f64) -> Self {
        Self {
            feature: feature.to_string(),
            value,
        }
    }
}

/// Score and explanation from one simulated engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub model: ModelKind,
    /// Score (0-100)
    pub score: u8,
    pub contributions: Vec<Contribution>,
}

impl ModelOutput {
    pub(crate) fn from_contributions(model: ModelKind, contributions: Vec<Contribution>) -> Self {
        let total: f64 = contributions.iter().map(|c| c.value).sum();
        Self {
            model,
            score: total.round().clamp(0.0, 100.0) as u8,
            contributions,
        }
    }
}
