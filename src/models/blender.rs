//! Blend of the two simulated engines into one ML score with ranked reasons

use super::{Contribution, ModelKind, ModelOutput};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Contributions at or below this many points never become reasons
const MIN_REASON_CONTRIBUTION: f64 = 3.0;

/// Blended ML score and its explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlBlend {
    /// ML score (0-100)
    pub score: u8,
    pub reasons: Vec<String>,
}

/// How many reasons an ML score is allowed to surface
pub fn reason_budget(ml_score: u8) -> usize {
    match ml_score {
        50.. => 4,
        30..=49 => 2,
        15..=29 => 1,
        _ => 0,
    }
}

fn qualifier(value: f64, model_total: u8) -> &'static str {
    let share = if model_total == 0 {
        0.0
    } else {
        value / f64::from(model_total)
    };
    if share > 0.4 {
        "significant"
    } else if share > 0.2 {
        "moderate"
    } else {
        "minor"
    }
}

fn render(contribution: &Contribution, model: ModelKind, model_total: u8) -> String {
    format!(
        "{} was a {} factor in {} analysis ({:.1}/{})",
        contribution.feature,
        qualifier(contribution.value, model_total),
        model,
        contribution.value,
        model_total
    )
}

/// Merge anomaly and fraud-probability outputs
pub fn blend(anomaly: &ModelOutput, fraud: &ModelOutput) -> MlBlend {
    let score = (f64::from(anomaly.score) * 0.5 + f64::from(fraud.score) * 0.5).round() as u8;

    let mut ranked: Vec<(&Contribution, ModelKind, u8)> = anomaly
        .contributions
        .iter()
        .map(|c| (c, anomaly.model, anomaly.score))
        .chain(
            fraud
                .contributions
                .iter()
                .map(|c| (c, fraud.model, fraud.score)),
        )
        .filter(|(c, _, _)| c.value > MIN_REASON_CONTRIBUTION)
        .collect();

    // Stable: equal values keep anomaly entries first
    ranked.sort_by(|a, b| b.0.value.total_cmp(&a.0.value));

    let mut seen = HashSet::new();
    let reasons = ranked
        .into_iter()
        .filter(|(c, _, _)| seen.insert(c.feature.to_lowercase()))
        .take(reason_budget(score))
        .map(|(c, model, total)| render(c, model, total))
        .collect();

    MlBlend {
        score: score.min(100),
        reasons,
    }
}
