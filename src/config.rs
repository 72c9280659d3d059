//! Engine configuration
//!
//! Defaults reproduce the fixed scoring constants exactly. Loading from TOML
//! exists so deployments can pin the drift reference instant; changing the
//! weights or thresholds changes the model.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Longest drift window accepted, in days
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed "now" used for behavioral drift windows
    pub reference_time: DateTime<Utc>,
    pub drift: DriftWindows,
    pub blend: BlendWeights,
    pub thresholds: TierThresholds,
    pub adaptive: AdaptiveBands,
    /// Final score at or above which confirmation is recommended
    pub confirmation_threshold: u8,
}

/// Recent vs. baseline windows for drift detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftWindows {
    pub recent_days: i64,
    pub baseline_days: i64,
    pub min_recent: usize,
    pub min_baseline: usize,
}

/// Hybrid blend of rule and ML scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub rule_weight: f64,
    pub ml_weight: f64,
}

/// Score thresholds for the risk tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub high_risk: u8,
    pub warning: u8,
}

/// Volatility bands that shift the tier thresholds per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveBands {
    /// CV above which a spender counts as volatile
    pub volatile_cv: f64,
    /// CV below which a spender counts as regular
    pub regular_cv: f64,
    pub volatile: TierThresholds,
    pub regular: TierThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_time: Utc
                .with_ymd_and_hms(2026, 1, 31, 6, 30, 0)
                .single()
                .unwrap_or_default(),
            drift: DriftWindows::default(),
            blend: BlendWeights::default(),
            thresholds: TierThresholds::default(),
            adaptive: AdaptiveBands::default(),
            confirmation_threshold: 50,
        }
    }
}

impl Default for DriftWindows {
    fn default() -> Self {
        Self {
            recent_days: 14,
            baseline_days: 90,
            min_recent: 2,
            min_baseline: 3,
        }
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            rule_weight: 0.6,
            ml_weight: 0.4,
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high_risk: 70,
            warning: 50,
        }
    }
}

impl Default for AdaptiveBands {
    fn default() -> Self {
        Self {
            volatile_cv: 0.8,
            regular_cv: 0.3,
            volatile: TierThresholds {
                high_risk: 78,
                warning: 58,
            },
            regular: TierThresholds {
                high_risk: 62,
                warning: 42,
            },
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents)?;
        tracing::info!("Engine config loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let blend = &self.blend;
        if blend.rule_weight < 0.0 || blend.ml_weight < 0.0 {
            return Err(ConfigError::Invalid(
                "Blend weights must be non-negative".to_string(),
            ));
        }
        if (blend.rule_weight + blend.ml_weight - 1.0).abs() > 1e-9 {
            return Err(ConfigError::Invalid(format!(
                "Blend weights must sum to 1.0, got {}",
                blend.rule_weight + blend.ml_weight
            )));
        }

        for (name, t) in [
            ("thresholds", &self.thresholds),
            ("adaptive.volatile", &self.adaptive.volatile),
            ("adaptive.regular", &self.adaptive.regular),
        ] {
            if t.warning >= t.high_risk || t.high_risk > 100 {
                return Err(ConfigError::Invalid(format!(
                    "{}: warning {} must be below high_risk {} (max 100)",
                    name, t.warning, t.high_risk
                )));
            }
        }

        let adaptive = &self.adaptive;
        if adaptive.regular_cv >= adaptive.volatile_cv {
            return Err(ConfigError::Invalid(format!(
                "regular_cv {} must be below volatile_cv {}",
                adaptive.regular_cv, adaptive.volatile_cv
            )));
        }
        if adaptive.volatile.high_risk < self.thresholds.high_risk
            || adaptive.volatile.warning < self.thresholds.warning
            || adaptive.regular.high_risk > self.thresholds.high_risk
            || adaptive.regular.warning > self.thresholds.warning
        {
            return Err(ConfigError::Invalid(
                "Volatile band must raise and regular band must lower thresholds".to_string(),
            ));
        }

        let drift = &self.drift;
        if drift.recent_days <= 0
            || drift.baseline_days <= drift.recent_days
            || drift.baseline_days > MAX_WINDOW_DAYS
        {
            return Err(ConfigError::Invalid(format!(
                "Drift windows invalid: recent {}d, baseline {}d",
                drift.recent_days, drift.baseline_days
            )));
        }

        Ok(())
    }
}
