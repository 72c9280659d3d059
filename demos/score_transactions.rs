//! Transaction scoring example
//!
//! Generates a seeded synthetic user, scores a handful of payments against
//! their profile, feeds the verdicts into a bounded live feed, and records a
//! confirmation.
//!
//! Run with `RUST_LOG=hybrid_risk_engine=debug` to see per-call breakdowns.

use chrono::Duration;
use hybrid_risk_engine::dataset::DatasetGenerator;
use hybrid_risk_engine::{
    BoundedFeed, ConfirmationVerdict, ConfirmationWorkflow, DestinationRegistry, FeedEvent,
    InMemoryProfileStore, ProfileStore, RiskEngine, ScoringRequest, ScoringResult, UserCategory,
};
use tracing_subscriber::EnvFilter;

fn print_result(label: &str, result: &ScoringResult) {
    println!("{}", label);
    println!("   Transaction ID: {}", result.transaction_id);
    println!(
        "   Risk Score: {}/100 ({}), confidence {}%",
        result.risk_score, result.risk_tier, result.confidence_score
    );
    println!(
        "   Rule {} | ML {} (anomaly {}, fraud {})",
        result.rule_score, result.ml_score, result.anomaly_score, result.fraud_probability_score
    );
    println!("   Action: {}", result.recommended_action);
    for reason in &result.reasons {
        println!("   - {}", reason);
    }
    let panel = result.receiver_risk();
    if panel.has_any_data() {
        println!("   Receiver: {:?}", panel);
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Hybrid Risk Engine ===\n");

    let engine = RiskEngine::default();
    let now = engine.config().reference_time;

    let mut generator = DatasetGenerator::seeded(2026, now);
    let profile = generator.generate_profile("USER-DEMO", UserCategory::Salaried);
    println!(
        "User {}: income {:.0}, avg txn {:.0}, cities {:?}\n",
        profile.user_id,
        profile.monthly_income,
        profile.avg_transaction_amount,
        profile.usual_cities
    );

    let mut registry = DestinationRegistry::new();
    for destination in &profile.usual_destinations {
        registry.register(destination, now - Duration::days(500), now);
    }
    registry.register("newshop@ybl", now - Duration::days(4), now);

    let home = profile.usual_cities[0].clone();
    let regular = profile.usual_destinations[0].clone();
    let avg = profile.avg_transaction_amount;

    let requests = vec![
        ("1. Everyday payment", ScoringRequest::new("TXN-DEMO-001", avg * 0.8, &home, &regular)),
        (
            "2. Larger payment from another city",
            ScoringRequest::new("TXN-DEMO-002", avg * 5.0, "Imphal", &regular),
        ),
        (
            "3. Salary-sized payment to a new destination",
            ScoringRequest::new("TXN-DEMO-003", profile.monthly_income, "Imphal", "newshop@ybl")
                .with_recent_count(3),
        ),
        (
            "4. Payment link with lure keywords",
            ScoringRequest::new("TXN-DEMO-004", avg, &home, "lucky.winner2026@paytm")
                .with_link("bit.ly/win50k")
                .with_device("DEVICE-UNSEEN"),
        ),
    ];

    let mut feed: BoundedFeed<ScoringResult> = BoundedFeed::with_capacity(3);
    feed.subscribe(|event: &FeedEvent<ScoringResult>| {
        if let FeedEvent::Evicted(result) = event {
            println!("   (feed evicted {})", result.transaction_id);
        }
    });

    for (label, request) in &requests {
        let result = engine.score(request, &profile, &registry);
        print_result(label, &result);
        feed.push(result);
    }

    println!("Live feed (newest first):");
    for result in feed.iter() {
        println!("   {} -> {}", result.transaction_id, result.risk_tier);
    }
    println!();

    println!("5. Confirming the larger payment as legitimate");
    let mut store = InMemoryProfileStore::new();
    store.insert(profile.clone());
    let (_, request) = &requests[1];
    let mut workflow = ConfirmationWorkflow::new(&engine, &mut store, &registry);
    match workflow.confirm(&profile.user_id, request, ConfirmationVerdict::Legit) {
        Ok(outcome) => {
            println!(
                "   New average: {:.0} (was {:.0})",
                outcome.profile.avg_transaction_amount, avg
            );
            println!("   Re-scored: {}/100", outcome.rescored.risk_score);
        }
        Err(e) => println!("   Confirmation failed: {}", e),
    }

    if let Ok(saved) = store.fetch(&profile.user_id) {
        println!("   History length: {}", saved.history.len());
    }
}
