#![allow(dead_code)]

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, MatchingConfig, MoneyCents, NewDonation, NewDonor, NewExpenditure, TriggerMode,
};
use migration::MigratorTrait;
use uuid::Uuid;

pub async fn db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub fn fast_retries() -> MatchingConfig {
    MatchingConfig {
        max_attempts: 4,
        base_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        commit_timeout: Duration::from_secs(5),
    }
}

pub fn engine_on(db: &DatabaseConnection) -> Engine {
    Engine::builder()
        .database(db.clone())
        .matching(fast_retries())
        .trigger(TriggerMode::Inline)
        .build()
        .unwrap()
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = db().await;
    let engine = engine_on(&db);
    (engine, db)
}

/// Noon UTC on the given day of January 2024.
pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

pub fn usd(dollars: i64) -> MoneyCents {
    MoneyCents::new(dollars * 100)
}

pub async fn donor(engine: &Engine, name: &str) -> Uuid {
    engine.new_donor(NewDonor::new(name)).await.unwrap().id
}

/// Insert a donation without triggering a pass.
pub async fn seed_donation(engine: &Engine, donor_id: Uuid, amount: MoneyCents, at: u32) -> Uuid {
    engine
        .store()
        .create_donation(NewDonation::new(donor_id, amount, day(at)))
        .await
        .unwrap()
        .id
}

/// Insert an expenditure without triggering a pass.
pub async fn seed_expenditure(engine: &Engine, amount: MoneyCents, at: u32) -> Uuid {
    engine
        .store()
        .create_expenditure(NewExpenditure::new(amount, "Shelter", day(at)))
        .await
        .unwrap()
        .id
}

/// Check every ledger invariant against the current store contents.
pub async fn assert_ledger_invariants(engine: &Engine) {
    let store = engine.store();
    let matches = store.list_matches().await.unwrap();

    let mut per_donation: HashMap<Uuid, MoneyCents> = HashMap::new();
    let mut per_expenditure: HashMap<Uuid, MoneyCents> = HashMap::new();
    let mut pairs = std::collections::HashSet::new();

    for m in &matches {
        assert!(m.allocated.is_positive(), "non-positive match {m:?}");
        assert!(
            pairs.insert((m.donation_id, m.expenditure_id)),
            "duplicate pair {m:?}"
        );
        let donation = store.donation(m.donation_id).await.unwrap();
        let expenditure = store.expenditure(m.expenditure_id).await.unwrap();
        assert!(donation.donated_at <= expenditure.spent_at, "late donation {m:?}");
        *per_donation.entry(m.donation_id).or_default() += m.allocated;
        *per_expenditure.entry(m.expenditure_id).or_default() += m.allocated;
    }

    for (id, total) in per_donation {
        let donation = store.donation(id).await.unwrap();
        assert!(total <= donation.amount, "donation {id} over-allocated");
    }
    for (id, total) in per_expenditure {
        let expenditure = store.expenditure(id).await.unwrap();
        assert!(total <= expenditure.amount, "expenditure {id} over-funded");
    }
}
