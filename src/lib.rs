//! # Hybrid Risk Engine
//!
//! Explainable, real-time fraud-risk scoring for a single payment against the
//! sender's behavioral profile.
//!
//! ## Pipeline
//!
//! - **Feature extraction**: amount, location, frequency, destination, device,
//!   travel, drift and payment-link deviation metrics
//! - **Rule engine**: additive, auditable threshold rules with reasons
//! - **Simulated ML**: an anomaly model and a fraud-probability model, blended
//!   with ranked explanations
//! - **Hybrid blend**: 60% rules, 40% ML
//! - **Adaptive tiers**: thresholds personalised by spending volatility
//! - **Confidence**: agreement and strength of the two engines
//!
//! Scoring is pure and synchronous. It never blocks a payment; it only
//! recommends a confirmation step.

pub mod config;
pub mod confirmation;
#[cfg(feature = "dataset")]
pub mod dataset;
pub mod destination;
pub mod drift;
pub mod features;
pub mod feed;
pub mod hybrid;
pub mod link_inspector;
pub mod models;
pub mod profile;
pub mod rules;

pub use config::{ConfigError, EngineConfig, TierThresholds};
pub use confirmation::{
    ConfirmationOutcome, ConfirmationVerdict, ConfirmationWorkflow, InMemoryProfileStore,
    ProfileStore, ServiceError,
};
pub use destination::{DestinationIdentifierInfo, DestinationLookup, DestinationRegistry};
pub use features::DeviationMetrics;
pub use feed::{BoundedFeed, FeedEvent, FeedObserver, SubscriptionId};
pub use hybrid::{AdaptiveThresholds, RiskTier};
pub use link_inspector::{inspect_link, LinkInspectionResult, LinkRiskTier};
pub use profile::{HistoricalTransaction, UserCategory, UserProfile};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

const DEFAULT_REASON: &str = "Transaction matches your typical pattern";

/// Inputs for scoring one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub transaction_id: String,
    pub amount: f64,
    pub city: String,
    pub destination_id: String,
    /// Transactions by this user in the last hour
    pub recent_transaction_count: u32,
    pub payment_link: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub device_id: Option<String>,
    pub previous_city: Option<String>,
    pub previous_timestamp: Option<DateTime<Utc>>,
}

impl ScoringRequest {
    pub fn new(transaction_id: &str, amount: f64, city: &str, destination_id: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            amount,
            city: city.to_string(),
            destination_id: destination_id.to_string(),
            recent_transaction_count: 0,
            payment_link: None,
            timestamp: None,
            device_id: None,
            previous_city: None,
            previous_timestamp: None,
        }
    }

    /// New request with a random transaction id
    pub fn generate(amount: f64, city: &str, destination_id: &str) -> Self {
        Self::new(
            &format!("TXN-{}", Uuid::new_v4().simple()),
            amount,
            city,
            destination_id,
        )
    }

    pub fn with_recent_count(mut self, count: u32) -> Self {
        self.recent_transaction_count = count;
        self
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.payment_link = Some(link.to_string());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_device(mut self, device_id: &str) -> Self {
        self.device_id = Some(device_id.to_string());
        self
    }

    pub fn with_previous_location(mut self, city: &str, timestamp: DateTime<Utc>) -> Self {
        self.previous_city = Some(city.to_string());
        self.previous_timestamp = Some(timestamp);
        self
    }
}

/// Recommended next step for the payment flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    Allow,
    ConfirmationRequired,
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendedAction::Allow => write!(f, "ALLOW"),
            RecommendedAction::ConfirmationRequired => write!(f, "CONFIRMATION_REQUIRED"),
        }
    }
}

/// Receiver-side risk details, each present only when known
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiverRiskPanel {
    pub destination_age_days: Option<u32>,
    pub destination_risk_score: Option<u8>,
    pub link_domain: Option<String>,
    pub link_risk_score: Option<u8>,
    pub lookalike_target: Option<String>,
}

impl ReceiverRiskPanel {
    pub fn has_any_data(&self) -> bool {
        self.destination_age_days.is_some()
            || self.destination_risk_score.is_some()
            || self.link_domain.is_some()
            || self.link_risk_score.is_some()
            || self.lookalike_target.is_some()
    }
}

/// Final verdict for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub transaction_id: String,
    /// Final hybrid score (0-100)
    pub risk_score: u8,
    pub risk_tier: RiskTier,
    pub rule_score: u8,
    pub ml_score: u8,
    pub anomaly_score: u8,
    pub fraud_probability_score: u8,
    /// Mean of rule and ML scores
    pub behavioral_score: u8,
    /// Rule reasons first, then ML reasons
    pub reasons: Vec<String>,
    pub recommended_action: RecommendedAction,
    /// Confidence (0-100)
    pub confidence_score: u8,
    pub adaptive_thresholds: AdaptiveThresholds,
    pub metrics: DeviationMetrics,
}

impl ScoringResult {
    pub fn requires_confirmation(&self) -> bool {
        self.recommended_action == RecommendedAction::ConfirmationRequired
    }

    /// Receiver panel: only destination facts that carry signal, plus link details
    pub fn receiver_risk(&self) -> ReceiverRiskPanel {
        let m = &self.metrics;
        let link = m.link_inspection.as_ref();
        ReceiverRiskPanel {
            destination_age_days: m.is_new_destination.then_some(m.destination_age_days),
            destination_risk_score: (m.destination_risk_score > 0)
                .then_some(m.destination_risk_score),
            link_domain: link.map(|l| l.domain.clone()),
            link_risk_score: link.map(|l| l.risk_score),
            lookalike_target: link
                .filter(|l| l.is_lookalike())
                .and_then(|l| l.lookalike_target.clone()),
        }
    }

    /// Export as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Hex SHA-256 of the canonical JSON form, for replay comparison
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}

/// Hybrid risk scoring engine
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: EngineConfig,
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score a transaction against the user's profile
    pub fn score<R>(
        &self,
        request: &ScoringRequest,
        profile: &UserProfile,
        registry: &R,
    ) -> ScoringResult
    where
        R: DestinationLookup + ?Sized,
    {
        let destination = registry.lookup(&request.destination_id);
        let metrics = features::extract(request, &destination, profile, &self.config);

        let rule = rules::score_rules(&metrics);
        let anomaly = models::score_anomaly(&metrics);
        let fraud = models::score_fraud_probability(&metrics);
        let ml = models::blend(&anomaly, &fraud);

        let risk_score = hybrid::combine(rule.score, ml.score, &self.config.blend);
        let adaptive =
            AdaptiveThresholds::for_profile(profile, self.config.thresholds, &self.config.adaptive);
        let risk_tier = adaptive.classify(risk_score);
        let confidence_score = hybrid::confidence(rule.score, ml.score);

        let mut reasons = rule.reasons;
        reasons.extend(ml.reasons);
        if reasons.is_empty() {
            reasons.push(DEFAULT_REASON.to_string());
        }

        let recommended_action = if risk_score >= self.config.confirmation_threshold {
            RecommendedAction::ConfirmationRequired
        } else {
            RecommendedAction::Allow
        };

        debug!(
            transaction_id = %request.transaction_id,
            user_id = %profile.user_id,
            rule_score = rule.score,
            anomaly_score = anomaly.score,
            fraud_score = fraud.score,
            ml_score = ml.score,
            risk_score,
            tier = %risk_tier,
            cv = adaptive.coefficient_of_variation,
            "Transaction scored"
        );

        ScoringResult {
            transaction_id: request.transaction_id.clone(),
            risk_score,
            risk_tier,
            rule_score: rule.score,
            ml_score: ml.score,
            anomaly_score: anomaly.score,
            fraud_probability_score: fraud.score,
            behavioral_score: ((f64::from(rule.score) + f64::from(ml.score)) / 2.0).round() as u8,
            reasons,
            recommended_action,
            confidence_score,
            adaptive_thresholds: adaptive,
            metrics,
        }
    }

    /// Score several transactions for the same user
    pub fn score_batch<R>(
        &self,
        requests: &[ScoringRequest],
        profile: &UserProfile,
        registry: &R,
    ) -> Vec<ScoringResult>
    where
        R: DestinationLookup + ?Sized,
    {
        requests
            .iter()
            .map(|request| self.score(request, profile, registry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures::{chennai_user, reference_time};
    use chrono::{Duration, TimeZone};

    fn registry() -> DestinationRegistry {
        let now = reference_time();
        let mut registry = DestinationRegistry::new();
        registry.register("swiggy@paytm", now - Duration::days(400), now);
        registry.register("zomato@okaxis", now - Duration::days(700), now);
        registry.register("unknown@ybl", now - Duration::days(5), now);
        registry
    }

    fn score(request: &ScoringRequest) -> ScoringResult {
        RiskEngine::default().score(request, &chennai_user(), &registry())
    }

    #[test]
    fn test_typical_payment_is_safe() {
        let result = score(&ScoringRequest::new("TXN-001", 400.0, "Chennai", "swiggy@paytm"));

        assert!(result.risk_score <= 30);
        assert_eq!(result.risk_tier, RiskTier::Safe);
        assert_eq!(result.rule_score, 0);
        assert_eq!(result.recommended_action, RecommendedAction::Allow);
        assert_eq!(result.reasons, vec![DEFAULT_REASON.to_string()]);
    }

    #[test]
    fn test_moderate_deviation_in_new_city() {
        let result = score(&ScoringRequest::new("TXN-002", 2500.0, "Imphal", "swiggy@paytm"));

        assert!((20..=70).contains(&result.risk_score));
        assert_ne!(result.risk_tier, RiskTier::HighRisk);
        assert_eq!(result.rule_score, 33);
        assert!(result.reasons[0].starts_with("Amount is 5.0x"));
        assert!(result.reasons[1].contains("unfamiliar city"));
    }

    #[test]
    fn test_salary_sized_payment_to_new_destination() {
        let request =
            ScoringRequest::new("TXN-003", 50_000.0, "Imphal", "unknown@ybl").with_recent_count(3);
        let result = score(&request);

        assert!(result.risk_score >= 75);
        assert_eq!(result.risk_tier, RiskTier::HighRisk);
        assert!(result.requires_confirmation());
        assert_eq!(result.metrics.destination_age_days, 5);
        assert!(result.metrics.is_first_time_destination);

        let panel = result.receiver_risk();
        assert!(panel.has_any_data());
        assert_eq!(panel.destination_age_days, Some(5));
        assert_eq!(panel.destination_risk_score, Some(70));
    }

    #[test]
    fn test_lure_destination_extreme_amount() {
        let request = ScoringRequest::new("TXN-004", 500_000.0, "Imphal", "lucky.winner2026@paytm")
            .with_recent_count(5);
        let result = score(&request);

        assert!(result.risk_score >= 85);
        assert_eq!(result.risk_tier, RiskTier::HighRisk);
        assert_eq!(result.rule_score, 100);
        assert_eq!(result.metrics.destination_risk_score, 100);
        assert_eq!(result.metrics.destination_age_days, 1);
    }

    #[test]
    fn test_rule_reasons_precede_ml_reasons() {
        let request = ScoringRequest::new("TXN-005", 50_000.0, "Imphal", "unknown@ybl")
            .with_recent_count(3);
        let result = score(&request);

        let first_ml = result
            .reasons
            .iter()
            .position(|r| r.contains(" analysis ("))
            .unwrap();
        assert!(first_ml > 0);
        assert!(result.reasons[first_ml..]
            .iter()
            .all(|r| r.contains(" analysis (")));
    }

    #[test]
    fn test_link_flows_into_result() {
        let request = ScoringRequest::new("TXN-006", 400.0, "Chennai", "swiggy@paytm")
            .with_link("bit.ly/win50k");
        let result = score(&request);
        assert!(result.metrics.has_payment_link);
        assert_eq!(result.metrics.link_risk_score, 23);
        assert_eq!(result.receiver_risk().link_domain.as_deref(), Some("bit.ly"));

        let trusted = score(
            &ScoringRequest::new("TXN-007", 400.0, "Chennai", "swiggy@paytm")
                .with_link("razorpay.com/pay"),
        );
        assert_eq!(trusted.metrics.link_risk_score, 0);
        assert_eq!(
            trusted.metrics.link_inspection.as_ref().map(|l| l.domain_age_days),
            Some(2000)
        );
    }

    #[test]
    fn test_quiet_result_has_empty_receiver_panel() {
        let result = score(&ScoringRequest::new("TXN-008", 400.0, "Chennai", "swiggy@paytm"));
        assert!(!result.receiver_risk().has_any_data());
    }

    fn request_grid() -> Vec<ScoringRequest> {
        let night = Utc.with_ymd_and_hms(2026, 1, 30, 22, 0, 0).unwrap();
        let mut requests = Vec::new();
        for (i, amount) in [0.0, 1.0, 120.0, 499.0, 2500.0, 50_000.0, 5_000_000.0]
            .into_iter()
            .enumerate()
        {
            for city in ["Chennai", "Imphal"] {
                for destination in ["swiggy@paytm", "unknown@ybl", "quick.cash@upi"] {
                    for recent in [0, 3, 12] {
                        let mut request =
                            ScoringRequest::new(&format!("TXN-G-{}", i), amount, city, destination)
                                .with_recent_count(recent)
                                .with_timestamp(night)
                                .with_device("DEVICE-OTHER")
                                .with_previous_location("Mumbai", night - Duration::minutes(20));
                        if recent == 12 {
                            request = request.with_link("https://paytrn.com/free-cashback");
                        }
                        requests.push(request);
                    }
                }
            }
        }
        requests
    }

    #[test]
    fn test_deterministic() {
        let engine = RiskEngine::default();
        let user = chennai_user();
        let registry = registry();
        for request in request_grid() {
            let first = engine.score(&request, &user, &registry);
            let second = engine.score(&request, &user, &registry);
            assert_eq!(first, second);
            assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        }
    }

    #[test]
    fn test_scores_bounded_and_reasons_present() {
        let engine = RiskEngine::default();
        let mut user = chennai_user();
        user.prior_fraud_incidents = 2;
        user.account_age_days = 3;
        let registry = registry();

        for result in engine.score_batch(&request_grid(), &user, &registry) {
            assert!(result.risk_score <= 100);
            assert!(result.rule_score <= 100);
            assert!(result.ml_score <= 100);
            assert!(result.anomaly_score <= 100);
            assert!(result.fraud_probability_score <= 100);
            assert!(result.confidence_score <= 100);
            assert!(result.metrics.link_risk_score <= 30);
            assert!(!result.reasons.is_empty());
            assert_eq!(
                result.requires_confirmation(),
                result.risk_score >= engine.config().confirmation_threshold
            );
        }
    }

    #[test]
    fn test_rule_score_monotonic_in_amount() {
        let engine = RiskEngine::default();
        let user = chennai_user();
        let registry = registry();

        let mut previous = 0;
        let mut amount = 1000.0;
        while amount <= 20_000.0 {
            let request = ScoringRequest::new("TXN-M", amount, "Chennai", "swiggy@paytm");
            let result = engine.score(&request, &user, &registry);
            assert!(result.rule_score >= previous, "rule score fell at {}", amount);
            previous = result.rule_score;
            amount += 250.0;
        }
    }

    #[test]
    fn test_volatile_user_gets_raised_thresholds() {
        let mut user = chennai_user();
        for (i, entry) in user.history.iter_mut().enumerate() {
            entry.amount = if i % 2 == 0 { 50.0 } else { 2000.0 };
        }
        let result = RiskEngine::default().score(
            &ScoringRequest::new("TXN-V", 400.0, "Chennai", "swiggy@paytm"),
            &user,
            &registry(),
        );
        assert!(result.adaptive_thresholds.coefficient_of_variation > 0.8);
        assert_eq!(result.adaptive_thresholds.thresholds.high_risk, 78);
    }

    #[test]
    fn test_json_export() {
        let result = score(&ScoringRequest::new("TXN-JSON", 400.0, "Chennai", "swiggy@paytm"));
        let json = result.to_json().unwrap();
        assert!(json.contains("TXN-JSON"));
        assert!(json.contains("\"risk_tier\": \"SAFE\""));
        assert!(json.contains("\"recommended_action\": \"ALLOW\""));
        assert_eq!(result.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ScoringRequest::generate(100.0, "Chennai", "swiggy@paytm");
        let b = ScoringRequest::generate(100.0, "Chennai", "swiggy@paytm");
        assert_ne!(a.transaction_id, b.transaction_id);
        assert!(a.transaction_id.starts_with("TXN-"));
    }
}
