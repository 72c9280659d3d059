//! Seedable synthetic profile generator
//!
//! Builds realistic user profiles and histories for demos, benches and
//! load tests. All randomness flows from one seeded `StdRng`, so the same
//! seed always yields the same dataset.

use crate::profile::{HistoricalTransaction, UserCategory, UserProfile};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Builder;

const CITIES: &[&str] = &[
    "Chennai", "Bangalore", "Mumbai", "Delhi", "Hyderabad", "Pune", "Kolkata", "Ahmedabad",
    "Jaipur", "Kochi",
];

const MERCHANTS: &[(&str, &str)] = &[
    ("swiggy@paytm", "food"),
    ("zomato@okaxis", "food"),
    ("bigbasket@okicici", "groceries"),
    ("amazon@apl", "shopping"),
    ("flipkart@axisbank", "shopping"),
    ("irctc@sbi", "travel"),
    ("uber@okhdfcbank", "travel"),
    ("bescom@ybl", "utilities"),
    ("airtel@paytm", "utilities"),
    ("landlord@oksbi", "rent"),
];

/// Income and spending ranges for a category
struct CategoryShape {
    income: (f64, f64),
    avg_amount: (f64, f64),
    weekly_frequency: (f64, f64),
}

fn shape(category: UserCategory) -> CategoryShape {
    match category {
        UserCategory::Salaried => CategoryShape {
            income: (40_000.0, 120_000.0),
            avg_amount: (400.0, 2_500.0),
            weekly_frequency: (8.0, 20.0),
        },
        UserCategory::Business => CategoryShape {
            income: (100_000.0, 500_000.0),
            avg_amount: (2_000.0, 15_000.0),
            weekly_frequency: (15.0, 40.0),
        },
        UserCategory::Student => CategoryShape {
            income: (5_000.0, 20_000.0),
            avg_amount: (80.0, 500.0),
            weekly_frequency: (5.0, 15.0),
        },
        UserCategory::HighSpender => CategoryShape {
            income: (150_000.0, 600_000.0),
            avg_amount: (3_000.0, 25_000.0),
            weekly_frequency: (10.0, 30.0),
        },
        UserCategory::LowSpender => CategoryShape {
            income: (15_000.0, 40_000.0),
            avg_amount: (100.0, 600.0),
            weekly_frequency: (2.0, 6.0),
        },
    }
}

/// Deterministic generator of synthetic users
pub struct DatasetGenerator {
    rng: StdRng,
    reference_time: DateTime<Utc>,
}

impl DatasetGenerator {
    /// Generator whose history ends at `reference_time`
    pub fn seeded(seed: u64, reference_time: DateTime<Utc>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            reference_time,
        }
    }

    fn id(&mut self, prefix: &str) -> String {
        let uuid = Builder::from_random_bytes(self.rng.gen()).into_uuid();
        format!("{}-{}", prefix, uuid.simple())
    }

    fn pick<'a>(&mut self, items: &'a [&'a str], count: usize) -> Vec<String> {
        items
            .choose_multiple(&mut self.rng, count)
            .map(|s| s.to_string())
            .collect()
    }

    /// Generate one profile of the given category
    pub fn generate_profile(&mut self, user_id: &str, category: UserCategory) -> UserProfile {
        let shape = shape(category);
        let monthly_income = self.rng.gen_range(shape.income.0..shape.income.1).round();
        let typical_amount = self.rng.gen_range(shape.avg_amount.0..shape.avg_amount.1);
        let avg_weekly_frequency =
            (self.rng.gen_range(shape.weekly_frequency.0..shape.weekly_frequency.1) * 10.0).round()
                / 10.0;

        let home_count = self.rng.gen_range(1..=3);
        let usual_cities = self.pick(CITIES, home_count);

        let merchant_count = self.rng.gen_range(3..=6);
        let usual_destinations: Vec<(String, String)> = MERCHANTS
            .choose_multiple(&mut self.rng, merchant_count)
            .map(|(id, cat)| (id.to_string(), cat.to_string()))
            .collect();

        let history = self.generate_history(
            user_id,
            typical_amount,
            &usual_cities,
            &usual_destinations,
        );

        let avg_transaction_amount = if history.is_empty() {
            typical_amount
        } else {
            history.iter().map(|t| t.amount).sum::<f64>() / history.len() as f64
        };

        let device_count = self.rng.gen_range(1..=2);
        let known_devices = (0..device_count).map(|_| self.id("DEVICE")).collect();

        UserProfile {
            user_id: user_id.to_string(),
            monthly_income,
            avg_transaction_amount: avg_transaction_amount.round(),
            avg_monthly_spend: (avg_transaction_amount * avg_weekly_frequency * 4.3).round(),
            avg_weekly_frequency,
            usual_cities,
            usual_destinations: usual_destinations.into_iter().map(|(id, _)| id).collect(),
            history,
            account_age_days: self.rng.gen_range(20..2_000),
            known_devices,
            prior_fraud_incidents: u32::from(self.rng.gen_bool(0.05)),
            category,
        }
    }

    /// Newest-first history spread over the 90 days before the reference time
    fn generate_history(
        &mut self,
        user_id: &str,
        typical_amount: f64,
        cities: &[String],
        destinations: &[(String, String)],
    ) -> Vec<HistoricalTransaction> {
        let count = self.rng.gen_range(20..=40);
        let mut history: Vec<HistoricalTransaction> = (0..count)
            .map(|_| {
                let minutes_ago = self.rng.gen_range(10..90 * 24 * 60);
                let spread = self.rng.gen_range(0.4..1.6);
                let (destination_id, category) = destinations
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or_else(|| ("unknown@upi".to_string(), "other".to_string()));
                let city = cities
                    .choose(&mut self.rng)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());

                HistoricalTransaction {
                    transaction_id: self.id("TXN"),
                    user_id: user_id.to_string(),
                    amount: (typical_amount * spread).round(),
                    timestamp: self.reference_time - Duration::minutes(minutes_ago),
                    city,
                    destination_id,
                    category,
                    payment_link: None,
                }
            })
            .collect();

        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        history
    }

    /// One profile per category, cycling through categories
    pub fn generate_population(&mut self, size: usize) -> Vec<UserProfile> {
        (0..size)
            .map(|i| {
                let category = UserCategory::ALL[i % UserCategory::ALL.len()];
                self.generate_profile(&format!("USER-{:04}", i + 1), category)
            })
            .collect()
    }
}
