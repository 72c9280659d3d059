//! Deviation metrics: the feature bundle every scorer reads

use crate::config::EngineConfig;
use crate::destination::DestinationIdentifierInfo;
use crate::drift::behavioral_drift;
use crate::link_inspector::{inspect_link, LinkInspectionResult, LinkRiskTier};
use crate::profile::UserProfile;
use crate::ScoringRequest;
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Lure terms that mark a destination identifier as suspicious
const DESTINATION_LURE_TERMS: &[&str] = &["cash", "earn", "lucky", "winner", "refund", "invest"];

/// Offset applied to the UTC hour to approximate local (IST) hour
const LOCAL_HOUR_OFFSET: u32 = 5;

/// Derived features for one transaction. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationMetrics {
    pub amount_deviation: f64,
    pub monthly_spend_ratio: f64,
    pub is_unfamiliar_location: bool,
    pub is_frequency_spike: bool,
    pub recent_transaction_count: u32,
    pub is_first_time_destination: bool,
    pub destination_age_days: u32,
    pub is_new_destination: bool,
    pub has_payment_link: bool,
    pub link_risk_tier: LinkRiskTier,
    pub is_night_transaction: bool,
    pub is_device_unrecognized: bool,
    pub is_rapid_small_transactions: bool,
    pub is_impossible_travel: bool,
    /// Destination risk (0-100)
    pub destination_risk_score: u8,
    pub account_age_days: u32,
    /// Time-of-day risk (0.0-1.0)
    pub time_of_day_risk: f64,
    pub has_prior_fraud: bool,
    pub salary_ratio: f64,
    /// Recent vs. baseline spend drift, percent
    pub behavioral_drift: u32,
    /// Link risk (0-30), 0 without a link
    pub link_risk_score: u8,
    pub link_inspection: Option<LinkInspectionResult>,
    pub previous_city: Option<String>,
    pub previous_timestamp: Option<DateTime<Utc>>,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Approximate local hour for a UTC timestamp
pub fn local_hour(timestamp: &DateTime<Utc>) -> u32 {
    (timestamp.hour() + LOCAL_HOUR_OFFSET) % 24
}

/// Time-of-day risk for a local hour
pub fn time_of_day_risk(hour: u32) -> f64 {
    if hour < 6 {
        0.8
    } else if hour >= 22 {
        0.5
    } else {
        0.1
    }
}

/// Destination risk (0-100) from novelty, age and lure terms
pub fn destination_risk_score(destination_id: &str, first_time: bool, age_days: u32) -> u8 {
    let mut score: u32 = 0;
    if first_time {
        score += 30;
    }
    if age_days < 7 {
        score += 40;
    } else if age_days < 30 {
        score += 20;
    }
    let lowered = destination_id.to_lowercase();
    if DESTINATION_LURE_TERMS.iter().any(|t| lowered.contains(t)) {
        score += 30;
    }
    score.min(100) as u8
}

fn is_impossible_travel(
    city: &str,
    timestamp: Option<DateTime<Utc>>,
    previous_city: Option<&str>,
    previous_timestamp: Option<DateTime<Utc>>,
) -> bool {
    let (Some(now), Some(prev_city), Some(prev_time)) =
        (timestamp, previous_city, previous_timestamp)
    else {
        return false;
    };
    if prev_city.to_lowercase() == city.to_lowercase() {
        return false;
    }
    let elapsed = now - prev_time;
    elapsed > Duration::zero() && elapsed < Duration::hours(1)
}

/// Build the feature bundle for a transaction against a user's profile
pub fn extract(
    request: &ScoringRequest,
    destination: &DestinationIdentifierInfo,
    profile: &UserProfile,
    config: &EngineConfig,
) -> DeviationMetrics {
    let amount = request.amount;
    let recent = request.recent_transaction_count;

    let amount_deviation = ratio(amount, profile.avg_transaction_amount);
    let monthly_spend_ratio = ratio(profile.avg_monthly_spend + amount, profile.avg_monthly_spend);
    let is_frequency_spike = f64::from(recent) > profile.avg_weekly_frequency / 7.0;

    let is_first_time_destination = !profile.knows_destination(&request.destination_id);
    let destination_age_days = destination.age_days;

    let (is_night_transaction, time_risk) = match request.timestamp {
        Some(ts) => {
            let hour = local_hour(&ts);
            ((2..5).contains(&hour), time_of_day_risk(hour))
        }
        None => (false, 0.1),
    };

    let is_device_unrecognized = request
        .device_id
        .as_deref()
        .is_some_and(|device| !profile.knows_device(device));

    let link_inspection = inspect_link(request.payment_link.as_deref());
    let link_risk_tier = link_inspection
        .as_ref()
        .map(LinkRiskTier::classify)
        .unwrap_or_default();

    DeviationMetrics {
        amount_deviation,
        monthly_spend_ratio,
        is_unfamiliar_location: !profile.is_familiar_city(&request.city),
        is_frequency_spike,
        recent_transaction_count: recent,
        is_first_time_destination,
        destination_age_days,
        is_new_destination: destination_age_days < 30,
        has_payment_link: link_inspection.is_some(),
        link_risk_tier,
        is_night_transaction,
        is_device_unrecognized,
        is_rapid_small_transactions: amount < 500.0 && recent >= 3,
        is_impossible_travel: is_impossible_travel(
            &request.city,
            request.timestamp,
            request.previous_city.as_deref(),
            request.previous_timestamp,
        ),
        destination_risk_score: destination_risk_score(
            &request.destination_id,
            is_first_time_destination,
            destination_age_days,
        ),
        account_age_days: profile.account_age_days,
        time_of_day_risk: time_risk,
        has_prior_fraud: profile.has_fraud_history(),
        salary_ratio: ratio(amount, profile.monthly_income),
        behavioral_drift: behavioral_drift(&profile.history, config.reference_time, &config.drift),
        link_risk_score: link_inspection.as_ref().map_or(0, |l| l.risk_score),
        link_inspection,
        previous_city: request.previous_city.clone(),
        previous_timestamp: request.previous_timestamp,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures::{chennai_user, reference_time};
    use chrono::TimeZone;

    fn known_destination() -> DestinationIdentifierInfo {
        DestinationIdentifierInfo {
            identifier: "swiggy@paytm".to_string(),
            created_at: None,
            age_days: 400,
        }
    }

    fn request(amount: f64, city: &str) -> ScoringRequest {
        ScoringRequest::new("TXN-F-001", amount, city, "swiggy@paytm")
    }

    #[test]
    fn test_typical_transaction() {
        let user = chennai_user();
        let metrics = extract(
            &request(400.0, "Chennai"),
            &known_destination(),
            &user,
            &EngineConfig::default(),
        );

        assert!((metrics.amount_deviation - 0.8).abs() < 1e-9);
        assert!((metrics.monthly_spend_ratio - 15_400.0 / 15_000.0).abs() < 1e-9);
        assert!(!metrics.is_unfamiliar_location);
        assert!(!metrics.is_frequency_spike);
        assert!(!metrics.is_first_time_destination);
        assert!(!metrics.is_new_destination);
        assert!(!metrics.has_payment_link);
        assert_eq!(metrics.link_risk_tier, LinkRiskTier::None);
        assert!(!metrics.is_night_transaction);
        assert_eq!(metrics.time_of_day_risk, 0.1);
        assert!(!metrics.is_device_unrecognized);
        assert_eq!(metrics.destination_risk_score, 0);
        assert_eq!(metrics.behavioral_drift, 15);
        assert_eq!(metrics.link_risk_score, 0);
        assert!(metrics.link_inspection.is_none());
    }

    #[test]
    fn test_zero_denominators() {
        let mut user = chennai_user();
        user.avg_transaction_amount = 0.0;
        user.avg_monthly_spend = 0.0;
        user.monthly_income = 0.0;

        let metrics = extract(
            &request(1000.0, "Chennai"),
            &known_destination(),
            &user,
            &EngineConfig::default(),
        );
        assert_eq!(metrics.amount_deviation, 0.0);
        assert_eq!(metrics.monthly_spend_ratio, 0.0);
        assert_eq!(metrics.salary_ratio, 0.0);
    }

    #[test]
    fn test_night_and_time_of_day() {
        // 22:00 UTC is 03:00 local
        let night = Utc.with_ymd_and_hms(2026, 1, 30, 22, 0, 0).unwrap();
        assert_eq!(local_hour(&night), 3);

        let user = chennai_user();
        let metrics = extract(
            &request(400.0, "Chennai").with_timestamp(night),
            &known_destination(),
            &user,
            &EngineConfig::default(),
        );
        assert!(metrics.is_night_transaction);
        assert_eq!(metrics.time_of_day_risk, 0.8);

        assert_eq!(time_of_day_risk(23), 0.5);
        assert_eq!(time_of_day_risk(12), 0.1);
        // 00:30 UTC is 05:30 local: risky hour but outside the night window
        let dawn = Utc.with_ymd_and_hms(2026, 1, 30, 0, 30, 0).unwrap();
        let metrics = extract(
            &request(400.0, "Chennai").with_timestamp(dawn),
            &known_destination(),
            &user,
            &EngineConfig::default(),
        );
        assert!(!metrics.is_night_transaction);
        assert_eq!(metrics.time_of_day_risk, 0.8);
    }

    #[test]
    fn test_device_and_rapid_small() {
        let user = chennai_user();
        let req = request(200.0, "Chennai")
            .with_device("DEVICE-UNKNOWN")
            .with_recent_count(3);
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(metrics.is_device_unrecognized);
        assert!(metrics.is_rapid_small_transactions);
        assert!(metrics.is_frequency_spike);

        let req = request(200.0, "Chennai").with_device("DEVICE-PIXEL-7");
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(!metrics.is_device_unrecognized);
        assert!(!metrics.is_rapid_small_transactions);
    }

    #[test]
    fn test_impossible_travel() {
        let user = chennai_user();
        let now = reference_time();
        let req = request(400.0, "Delhi")
            .with_timestamp(now)
            .with_previous_location("Chennai", now - Duration::minutes(30));
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(metrics.is_impossible_travel);
        assert_eq!(metrics.previous_city.as_deref(), Some("Chennai"));

        // same city, different case
        let req = request(400.0, "CHENNAI")
            .with_timestamp(now)
            .with_previous_location("chennai", now - Duration::minutes(30));
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(!metrics.is_impossible_travel);

        // exactly one hour is not impossible
        let req = request(400.0, "Delhi")
            .with_timestamp(now)
            .with_previous_location("Chennai", now - Duration::hours(1));
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(!metrics.is_impossible_travel);

        // no current timestamp
        let req = request(400.0, "Delhi").with_previous_location("Chennai", now);
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(!metrics.is_impossible_travel);
    }

    #[test]
    fn test_destination_risk_score() {
        assert_eq!(destination_risk_score("swiggy@paytm", false, 400), 0);
        assert_eq!(destination_risk_score("unknown@ybl", true, 5), 70);
        assert_eq!(destination_risk_score("shop@ybl", true, 20), 50);
        assert_eq!(destination_risk_score("lucky.winner2026@paytm", true, 1), 100);
        assert_eq!(destination_risk_score("Quick-Cash@upi", false, 100), 30);
    }

    #[test]
    fn test_link_fields() {
        let user = chennai_user();
        let req = request(400.0, "Chennai").with_link("bit.ly/win50k");
        let metrics = extract(&req, &known_destination(), &user, &EngineConfig::default());
        assert!(metrics.has_payment_link);
        assert_eq!(metrics.link_risk_tier, LinkRiskTier::New);
        assert_eq!(metrics.link_risk_score, 23);
        assert!(metrics.link_inspection.is_some());
    }
}
