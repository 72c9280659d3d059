//! Deterministic rule-based scoring
//!
//! Every rule adds independent points and, when it fires, one reason. Points
//! are summed unclamped and capped at 100 only at the end.

use crate::features::DeviationMetrics;
use serde::{Deserialize, Serialize};

/// Output of the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    /// Rule score (0-100)
    pub score: u8,
    /// Reasons in rule evaluation order
    pub reasons: Vec<String>,
}

/// Points awarded for amount deviation beyond 2x the user's average
pub fn amount_deviation_points(deviation: f64) -> u32 {
    if deviation <= 2.0 {
        0
    } else if deviation <= 10.0 {
        (5.0 + (deviation - 2.0) * 2.5).round() as u32
    } else {
        (25.0 + ((deviation - 10.0) / 10.0).min(1.5) * 10.0).round() as u32
    }
}

fn salary_points(salary_ratio: f64) -> u32 {
    if salary_ratio > 2.0 {
        35
    } else if salary_ratio > 1.0 {
        30
    } else {
        20
    }
}

/// Score a feature bundle with the fixed rule set
pub fn score_rules(metrics: &DeviationMetrics) -> RuleScore {
    let mut total: u32 = 0;
    let mut reasons = Vec::new();

    let deviation = metrics.amount_deviation;
    if deviation > 2.0 {
        total += amount_deviation_points(deviation);
        if deviation > 10.0 {
            reasons.push(format!(
                "Extreme amount deviation: {:.1}x your average transaction",
                deviation
            ));
        } else {
            reasons.push(format!(
                "Amount is {:.1}x your average transaction",
                deviation
            ));
        }
    }

    if metrics.is_unfamiliar_location {
        total += 20;
        reasons.push("Transaction from an unfamiliar city".to_string());
    }

    if metrics.salary_ratio > 0.6 {
        total += salary_points(metrics.salary_ratio);
        reasons.push(format!(
            "Amount is {:.0}% of monthly income",
            metrics.salary_ratio * 100.0
        ));
    }

    if metrics.is_frequency_spike {
        total += 15;
        reasons.push(format!(
            "Unusual frequency: {} transactions in the last hour",
            metrics.recent_transaction_count
        ));
    }

    if metrics.is_night_transaction {
        total += 15;
        reasons.push("Late-night transaction (2 AM - 5 AM)".to_string());
    }

    if metrics.is_device_unrecognized {
        total += 10;
        reasons.push("Payment from an unrecognized device".to_string());
    }

    if metrics.is_impossible_travel {
        total += 20;
        reasons.push(match &metrics.previous_city {
            Some(city) => format!("Impossible travel: seen in {} less than an hour ago", city),
            None => "Impossible travel between locations".to_string(),
        });
    }

    if metrics.is_rapid_small_transactions {
        total += 10;
        reasons.push("Rapid small transactions (possible card testing)".to_string());
    }

    if metrics.has_prior_fraud {
        total += 5;
        reasons.push("Account has prior confirmed fraud".to_string());
    }

    if metrics.behavioral_drift > 40 {
        total += ((f64::from(metrics.behavioral_drift) / 10.0).round() as u32).min(10);
        reasons.push(format!(
            "Spending drifted {}% from baseline",
            metrics.behavioral_drift
        ));
    }

    RuleScore {
        score: total.min(100) as u8,
        reasons,
    }
}
