//! Hybrid blending, adaptive tiering and confidence estimation

use crate::config::{AdaptiveBands, BlendWeights, TierThresholds};
use crate::profile::UserProfile;
use serde::{Deserialize, Serialize};

/// Risk tier of a scored transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Safe,
    Warning,
    HighRisk,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Safe => write!(f, "SAFE"),
            RiskTier::Warning => write!(f, "WARNING"),
            RiskTier::HighRisk => write!(f, "HIGH_RISK"),
        }
    }
}

impl TierThresholds {
    /// Tier for a final score under these thresholds
    pub fn classify(&self, score: u8) -> RiskTier {
        if score >= self.high_risk {
            RiskTier::HighRisk
        } else if score >= self.warning {
            RiskTier::Warning
        } else {
            RiskTier::Safe
        }
    }
}

/// Weighted blend of rule and ML scores
pub fn combine(rule_score: u8, ml_score: u8, weights: &BlendWeights) -> u8 {
    let blended =
        f64::from(rule_score) * weights.rule_weight + f64::from(ml_score) * weights.ml_weight;
    blended.round().clamp(0.0, 100.0) as u8
}

/// Population standard deviation of historical amounts (0 with fewer than 3)
pub fn amount_std_dev(profile: &UserProfile) -> f64 {
    let amounts: Vec<f64> = profile.amounts().collect();
    if amounts.len() < 3 {
        return 0.0;
    }
    let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
    let variance =
        amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / amounts.len() as f64;
    variance.sqrt()
}

/// Per-user thresholds after volatility adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    pub coefficient_of_variation: f64,
    pub thresholds: TierThresholds,
}

impl AdaptiveThresholds {
    /// Shift `base` thresholds by the user's spending volatility
    pub fn for_profile(profile: &UserProfile, base: TierThresholds, bands: &AdaptiveBands) -> Self {
        let cv = if profile.avg_transaction_amount == 0.0 {
            0.0
        } else {
            amount_std_dev(profile) / profile.avg_transaction_amount
        };
        Self::for_cv(cv, base, bands)
    }

    pub fn for_cv(cv: f64, base: TierThresholds, bands: &AdaptiveBands) -> Self {
        let thresholds = if cv > bands.volatile_cv {
            bands.volatile
        } else if cv < bands.regular_cv {
            bands.regular
        } else {
            base
        };
        Self {
            coefficient_of_variation: cv,
            thresholds,
        }
    }

    pub fn classify(&self, score: u8) -> RiskTier {
        self.thresholds.classify(score)
    }
}

/// Confidence (0-100) from engine agreement and signal strength
pub fn confidence(rule_score: u8, ml_score: u8) -> u8 {
    let rule = f64::from(rule_score);
    let ml = f64::from(ml_score);
    let agreement = 100.0 - (rule - ml).abs();
    let strength = (rule + ml) / 2.0;

    let value = if strength < 10.0 {
        (agreement * 0.3).round()
    } else if agreement > 80.0 {
        (60.0 + strength * 0.4).round().min(100.0)
    } else if agreement > 50.0 {
        (40.0 + strength * 0.3).round().min(90.0)
    } else {
        (20.0 + strength * 0.2).round().min(70.0)
    };
    value.clamp(0.0, 100.0) as u8
}
