//! Supervised-style fraud probability ("LightGBM")
//!
//! Magnitude-aware contributions calibrated independently of each other, so
//! the weights do not sum to one.

use super::{Contribution, ModelKind, ModelOutput};
use crate::features::DeviationMetrics;

fn destination_age_points(days: u32) -> f64 {
    if days < 7 {
        20.0
    } else if days < 30 {
        10.0
    } else {
        0.0
    }
}

fn account_age_points(days: u32) -> f64 {
    if days < 30 {
        10.0
    } else if days < 90 {
        5.0
    } else {
        0.0
    }
}

fn link_points(metrics: &DeviationMetrics) -> f64 {
    match &metrics.link_inspection {
        Some(inspection) => f64::from(inspection.risk_score),
        None => metrics.link_risk_tier.fallback_contribution(),
    }
}

fn salary_overrun_points(salary_ratio: f64) -> f64 {
    if salary_ratio > 1.0 {
        ((salary_ratio - 1.0) / 2.0).min(1.0) * 12.0
    } else {
        0.0
    }
}

fn drift_points(drift: u32) -> f64 {
    if drift > 40 {
        (f64::from(drift - 40) / 60.0).min(1.0) * 8.0
    } else {
        0.0
    }
}

fn points(value: bool, on: f64) -> f64 {
    if value {
        on
    } else {
        0.0
    }
}

/// Fraud probability score with per-feature contributions
pub fn score_fraud_probability(metrics: &DeviationMetrics) -> ModelOutput {
    let contributions = vec![
        Contribution::new(
            "Destination Risk",
            f64::from(metrics.destination_risk_score) * 0.3,
        ),
        Contribution::new(
            "First-time Destination",
            points(metrics.is_first_time_destination, 15.0),
        ),
        Contribution::new(
            "Destination Age",
            destination_age_points(metrics.destination_age_days),
        ),
        Contribution::new("Link Risk", link_points(metrics)),
        Contribution::new("Device Change", points(metrics.is_device_unrecognized, 12.0)),
        Contribution::new("Night Transaction", points(metrics.is_night_transaction, 8.0)),
        Contribution::new("Account Age", account_age_points(metrics.account_age_days)),
        Contribution::new("Fraud History", points(metrics.has_prior_fraud, 10.0)),
        Contribution::new(
            "Amount Anomaly",
            (metrics.amount_deviation / 15.0).min(1.0) * 15.0,
        ),
        Contribution::new("Salary Overrun", salary_overrun_points(metrics.salary_ratio)),
        Contribution::new("Behavioral Drift", drift_points(metrics.behavioral_drift)),
    ];
    ModelOutput::from_contributions(ModelKind::LightGbm, contributions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::quiet_metrics;
    use crate::link_inspector::{inspect_link, LinkRiskTier};

    fn contribution(output: &ModelOutput, feature: &str) -> f64 {
        output
            .contributions
            .iter()
            .find(|c| c.feature == feature)
            .map(|c| c.value)
            .unwrap()
    }

    #[test]
    fn test_quiet_profile() {
        let output = score_fraud_probability(&quiet_metrics());
        assert_eq!(output.model, ModelKind::LightGbm);
        // amount anomaly 1/15 * 15 = 1
        assert_eq!(output.score, 1);
    }

    #[test]
    fn test_new_unknown_destination() {
        let mut metrics = quiet_metrics();
        metrics.amount_deviation = 100.0;
        metrics.salary_ratio = 1.0;
        metrics.is_first_time_destination = true;
        metrics.destination_age_days = 5;
        metrics.destination_risk_score = 70;

        let output = score_fraud_probability(&metrics);
        // 21 + 15 + 20 + 15
        assert_eq!(output.score, 71);
        assert_eq!(contribution(&output, "Salary Overrun"), 0.0);
    }

    #[test]
    fn test_link_uses_inspection_score() {
        let mut metrics = quiet_metrics();
        metrics.link_inspection = inspect_link(Some("bit.ly/win50k"));
        metrics.link_risk_tier = LinkRiskTier::New;
        let output = score_fraud_probability(&metrics);
        assert_eq!(contribution(&output, "Link Risk"), 23.0);
    }

    #[test]
    fn test_link_fallback_by_tier() {
        let mut metrics = quiet_metrics();
        metrics.has_payment_link = true;
        for (tier, expected) in [
            (LinkRiskTier::New, 20.0),
            (LinkRiskTier::Unknown, 15.0),
            (LinkRiskTier::Trusted, 3.0),
            (LinkRiskTier::None, 0.0),
        ] {
            metrics.link_risk_tier = tier;
            let output = score_fraud_probability(&metrics);
            assert_eq!(contribution(&output, "Link Risk"), expected);
        }
    }

    #[test]
    fn test_magnitude_signals() {
        assert_eq!(salary_overrun_points(2.0), 6.0);
        assert_eq!(salary_overrun_points(10.0), 12.0);
        assert_eq!(drift_points(40), 0.0);
        assert_eq!(drift_points(70), 4.0);
        assert_eq!(drift_points(500), 8.0);
    }

    #[test]
    fn test_score_capped() {
        let mut metrics = quiet_metrics();
        metrics.destination_risk_score = 100;
        metrics.is_first_time_destination = true;
        metrics.destination_age_days = 1;
        metrics.link_risk_tier = LinkRiskTier::New;
        metrics.is_device_unrecognized = true;
        metrics.is_night_transaction = true;
        metrics.account_age_days = 5;
        metrics.has_prior_fraud = true;
        metrics.amount_deviation = 100.0;
        metrics.salary_ratio = 10.0;
        metrics.behavioral_drift = 300;

        assert_eq!(score_fraud_probability(&metrics).score, 100);
    }
}
