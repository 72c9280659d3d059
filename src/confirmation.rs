//! Confirmation workflow around the scoring engine
//!
//! Fetches the sender's profile, scores the payment, and applies the user's
//! verdict. Profile changes are made on a copy and saved once, so a failed
//! confirm never leaves a half-updated profile behind.

use crate::destination::DestinationLookup;
use crate::profile::{HistoricalTransaction, UserProfile};
use crate::{RiskEngine, ScoringRequest, ScoringResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// Failures of the collaborators around the engine
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServiceError {
    #[error("Failed to fetch profile for {user_id}: {reason}")]
    FetchFailed { user_id: String, reason: String },

    #[error("Failed to confirm transaction {transaction_id}: {reason}")]
    ConfirmFailed {
        transaction_id: String,
        reason: String,
    },
}

/// Storage of user profiles
pub trait ProfileStore {
    fn fetch(&self, user_id: &str) -> Result<UserProfile, ServiceError>;
    fn save(&mut self, profile: UserProfile) -> Result<(), ServiceError>;
}

/// In-memory profile store
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: HashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: UserProfile) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn fetch(&self, user_id: &str) -> Result<UserProfile, ServiceError> {
        self.profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| ServiceError::FetchFailed {
                user_id: user_id.to_string(),
                reason: "unknown user".to_string(),
            })
    }

    fn save(&mut self, profile: UserProfile) -> Result<(), ServiceError> {
        self.profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

/// User's answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationVerdict {
    Legit,
    Fraud,
}

/// Result of applying a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationOutcome {
    pub verdict: ConfirmationVerdict,
    pub profile: UserProfile,
    /// The same transaction re-scored against the updated profile
    pub rescored: ScoringResult,
}

/// Scores payments and records confirmation verdicts
pub struct ConfirmationWorkflow<'a, S, R: ?Sized> {
    engine: &'a RiskEngine,
    store: &'a mut S,
    registry: &'a R,
}

impl<'a, S, R> ConfirmationWorkflow<'a, S, R>
where
    S: ProfileStore,
    R: DestinationLookup + ?Sized,
{
    pub fn new(engine: &'a RiskEngine, store: &'a mut S, registry: &'a R) -> Self {
        Self {
            engine,
            store,
            registry,
        }
    }

    /// Fetch the user's profile and score the payment
    pub fn assess(
        &self,
        user_id: &str,
        request: &ScoringRequest,
    ) -> Result<ScoringResult, ServiceError> {
        let profile = self.store.fetch(user_id)?;
        Ok(self.engine.score(request, &profile, self.registry))
    }

    /// Apply the user's verdict for a payment
    pub fn confirm(
        &mut self,
        user_id: &str,
        request: &ScoringRequest,
        verdict: ConfirmationVerdict,
    ) -> Result<ConfirmationOutcome, ServiceError> {
        let mut profile = self
            .store
            .fetch(user_id)
            .map_err(|e| ServiceError::ConfirmFailed {
                transaction_id: request.transaction_id.clone(),
                reason: e.to_string(),
            })?;

        match verdict {
            ConfirmationVerdict::Legit => {
                let timestamp = request
                    .timestamp
                    .unwrap_or(self.engine.config().reference_time);
                profile.record_confirmed(HistoricalTransaction {
                    transaction_id: request.transaction_id.clone(),
                    user_id: profile.user_id.clone(),
                    amount: request.amount,
                    timestamp,
                    city: request.city.clone(),
                    destination_id: request.destination_id.clone(),
                    category: "confirmed".to_string(),
                    payment_link: request.payment_link.clone(),
                });
            }
            ConfirmationVerdict::Fraud => profile.record_fraud(),
        }

        if let Err(e) = self.store.save(profile.clone()) {
            warn!(
                transaction_id = %request.transaction_id,
                user_id,
                error = %e,
                "Confirmation not recorded"
            );
            return Err(ServiceError::ConfirmFailed {
                transaction_id: request.transaction_id.clone(),
                reason: e.to_string(),
            });
        }

        info!(
            transaction_id = %request.transaction_id,
            user_id,
            verdict = ?verdict,
            "Confirmation recorded"
        );

        let rescored = self.engine.score(request, &profile, self.registry);
        Ok(ConfirmationOutcome {
            verdict,
            profile,
            rescored,
        })
    }
}
