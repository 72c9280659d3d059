//! User behavioral profiles and their transaction history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spending category, used for dataset generation only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserCategory {
    Salaried,
    Business,
    Student,
    HighSpender,
    LowSpender,
}

impl UserCategory {
    pub const ALL: [UserCategory; 5] = [
        UserCategory::Salaried,
        UserCategory::Business,
        UserCategory::Student,
        UserCategory::HighSpender,
        UserCategory::LowSpender,
    ];
}

impl std::fmt::Display for UserCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserCategory::Salaried => write!(f, "salaried"),
            UserCategory::Business => write!(f, "business"),
            UserCategory::Student => write!(f, "student"),
            UserCategory::HighSpender => write!(f, "high_spender"),
            UserCategory::LowSpender => write!(f, "low_spender"),
        }
    }
}

/// A completed transaction in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTransaction {
    pub transaction_id: String,
    pub user_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub destination_id: String,
    pub category: String,
    pub payment_link: Option<String>,
}

/// Behavioral baseline of a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub monthly_income: f64,
    pub avg_transaction_amount: f64,
    pub avg_monthly_spend: f64,
    pub avg_weekly_frequency: f64,
    pub usual_cities: Vec<String>,
    pub usual_destinations: Vec<String>,
    /// Newest first
    pub history: Vec<HistoricalTransaction>,
    pub account_age_days: u32,
    pub known_devices: Vec<String>,
    pub prior_fraud_incidents: u32,
    pub category: UserCategory,
}

impl UserProfile {
    /// True when `city` contains, or is contained by, one of the usual cities
    pub fn is_familiar_city(&self, city: &str) -> bool {
        let city = city.to_lowercase();
        self.usual_cities.iter().any(|usual| {
            let usual = usual.to_lowercase();
            city.contains(&usual) || usual.contains(&city)
        })
    }

    /// Case-insensitive membership in the usual destination set
    pub fn knows_destination(&self, destination_id: &str) -> bool {
        self.usual_destinations
            .iter()
            .any(|d| d.eq_ignore_ascii_case(destination_id))
    }

    pub fn knows_device(&self, device_id: &str) -> bool {
        self.known_devices.iter().any(|d| d == device_id)
    }

    pub fn has_fraud_history(&self) -> bool {
        self.prior_fraud_incidents > 0
    }

    /// Historical amounts, newest first
    pub fn amounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().map(|t| t.amount)
    }

    /// Fold a transaction the user confirmed as legitimate into the profile.
    ///
    /// Updates the running average over the existing history and prepends the
    /// transaction, keeping history newest first.
    pub fn record_confirmed(&mut self, transaction: HistoricalTransaction) {
        let n = self.history.len() as f64;
        self.avg_transaction_amount =
            (self.avg_transaction_amount * n + transaction.amount) / (n + 1.0);
        self.history.insert(0, transaction);
    }

    /// Count a confirmed fraud incident against this profile
    pub fn record_fraud(&mut self) {
        self.prior_fraud_incidents = self.prior_fraud_incidents.saturating_add(1);
    }
}
