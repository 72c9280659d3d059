//! Unsupervised-style anomaly score ("Isolation Forest")
//!
//! Ten normalized signals in [0, 1], weighted to sum to 1.0 and scaled to
//! score points.

use super::{Contribution, ModelKind, ModelOutput};
use crate::features::DeviationMetrics;

fn flag(value: bool, on: f64) -> f64 {
    if value {
        on
    } else {
        0.0
    }
}

fn account_age_signal(days: u32) -> f64 {
    if days < 30 {
        1.0
    } else if days < 90 {
        0.4
    } else {
        0.0
    }
}

/// Spend overrun against monthly spend or income, whichever is larger
fn spend_overrun_signal(metrics: &DeviationMetrics) -> f64 {
    let over_spend = (metrics.monthly_spend_ratio - 1.0).max(0.0);
    over_spend.max(metrics.salary_ratio).min(1.0)
}

/// (feature, weight, signal) rows of the anomaly model
fn signals(metrics: &DeviationMetrics) -> [(&'static str, f64, f64); 10] {
    [
        ("Amount Deviation", 0.22, (metrics.amount_deviation / 10.0).min(1.0)),
        ("Spending Overrun", 0.13, spend_overrun_signal(metrics)),
        ("Unfamiliar Location", 0.15, flag(metrics.is_unfamiliar_location, 1.0)),
        ("Frequency Spike", 0.10, flag(metrics.is_frequency_spike, 0.85)),
        ("Time of Day", 0.08, metrics.time_of_day_risk),
        ("Impossible Travel", 0.10, flag(metrics.is_impossible_travel, 1.0)),
        ("Device Change", 0.07, flag(metrics.is_device_unrecognized, 0.9)),
        ("Account Age", 0.05, account_age_signal(metrics.account_age_days)),
        ("Rapid Small Transactions", 0.04, flag(metrics.is_rapid_small_transactions, 0.8)),
        ("Behavioral Drift", 0.06, (f64::from(metrics.behavioral_drift) / 80.0).min(1.0)),
    ]
}

/// Anomaly score with per-feature contributions
pub fn score_anomaly(metrics: &DeviationMetrics) -> ModelOutput {
    let contributions = signals(metrics)
        .into_iter()
        .map(|(feature, weight, signal)| Contribution::new(feature, signal * weight * 100.0))
        .collect();
    ModelOutput::from_contributions(ModelKind::IsolationForest, contributions)
}
