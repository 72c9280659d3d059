//! Payment destination registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Age assumed for destinations the registry has never seen
pub const UNKNOWN_DESTINATION_AGE_DAYS: u32 = 1;

/// Registry entry for a payment destination identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationIdentifierInfo {
    pub identifier: String,
    pub created_at: Option<DateTime<Utc>>,
    pub age_days: u32,
}

impl DestinationIdentifierInfo {
    /// Conservative entry for an unregistered destination
    pub fn unknown(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            created_at: None,
            age_days: UNKNOWN_DESTINATION_AGE_DAYS,
        }
    }
}

/// Lookup of destination metadata
pub trait DestinationLookup {
    fn get(&self, identifier: &str) -> Option<DestinationIdentifierInfo>;

    /// Look up a destination, treating unknown identifiers as brand new
    fn lookup(&self, identifier: &str) -> DestinationIdentifierInfo {
        self.get(identifier)
            .unwrap_or_else(|| DestinationIdentifierInfo::unknown(identifier))
    }
}

/// In-memory destination registry, keyed case-insensitively
#[derive(Debug, Clone, Default)]
pub struct DestinationRegistry {
    entries: HashMap<String, DestinationIdentifierInfo>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a destination created at `created_at`, aged against `reference`
    pub fn register(
        &mut self,
        identifier: &str,
        created_at: DateTime<Utc>,
        reference: DateTime<Utc>,
    ) {
        let age_days = (reference - created_at).num_days().max(0) as u32;
        self.insert(DestinationIdentifierInfo {
            identifier: identifier.to_string(),
            created_at: Some(created_at),
            age_days,
        });
    }

    pub fn insert(&mut self, info: DestinationIdentifierInfo) {
        self.entries.insert(info.identifier.to_lowercase(), info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DestinationLookup for DestinationRegistry {
    fn get(&self, identifier: &str) -> Option<DestinationIdentifierInfo> {
        self.entries.get(&identifier.to_lowercase()).cloned()
    }
}
