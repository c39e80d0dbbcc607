mod common;

use engine::{MoneyCents, NewDonation, NewExpenditure, PassOutcome};

use common::*;

fn completed(outcome: PassOutcome) -> Vec<engine::Match> {
    match outcome {
        PassOutcome::Completed(created) => created,
        other => panic!("expected a completed pass, got {other:?}"),
    }
}

#[tokio::test]
async fn donation_partially_funds_later_expenditure() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;

    let donation = engine
        .record_donation(NewDonation::new(alice, usd(100), day(1)))
        .await
        .unwrap();
    assert!(completed(donation.matching).is_empty());

    let expenditure = engine
        .record_expenditure(NewExpenditure::new(usd(60), "Food bank", day(2)))
        .await
        .unwrap();
    let created = completed(expenditure.matching);

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].allocated, usd(60));
    assert_eq!(created[0].donation_id, donation.record.id);
    assert_eq!(created[0].expenditure_id, expenditure.record.id);
    assert_eq!(
        engine.donation_remaining(donation.record.id).await.unwrap(),
        usd(40)
    );
    assert_eq!(
        engine
            .expenditure_remaining(expenditure.record.id)
            .await
            .unwrap(),
        MoneyCents::ZERO
    );
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn older_donation_is_drawn_first() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;
    let bob = donor(&engine, "Bob").await;

    // Recorded newest first so ordering has to come from donated_at.
    let second = seed_donation(&engine, bob, usd(50), 2).await;
    let first = seed_donation(&engine, alice, usd(50), 1).await;

    let expenditure = engine
        .record_expenditure(NewExpenditure::new(usd(80), "Rent", day(3)))
        .await
        .unwrap();
    let created = completed(expenditure.matching);

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].donation_id, first);
    assert_eq!(created[0].allocated, usd(50));
    assert_eq!(created[1].donation_id, second);
    assert_eq!(created[1].allocated, usd(30));
    assert_eq!(engine.donation_remaining(second).await.unwrap(), usd(20));
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn expenditure_without_eligible_donations_waits() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;

    let expenditure = engine
        .record_expenditure(NewExpenditure::new(usd(100), "Medicine", day(10)))
        .await
        .unwrap();
    assert!(completed(expenditure.matching).is_empty());

    // Dated after the expenditure: not eligible.
    let late = engine
        .record_donation(NewDonation::new(alice, usd(100), day(11)))
        .await
        .unwrap();
    assert!(completed(late.matching).is_empty());

    // Dated before: funds it.
    let early = engine
        .record_donation(NewDonation::new(alice, usd(70), day(9)))
        .await
        .unwrap();
    let created = completed(early.matching);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].allocated, usd(70));
    assert_eq!(
        engine
            .expenditure_remaining(expenditure.record.id)
            .await
            .unwrap(),
        usd(30)
    );
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn donation_at_the_same_instant_is_eligible() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;
    seed_donation(&engine, alice, usd(10), 5).await;
    seed_expenditure(&engine, usd(10), 5).await;

    let created = engine.run_matching().await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].allocated, usd(10));
}

#[tokio::test]
async fn second_pass_without_inserts_creates_nothing() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;
    seed_donation(&engine, alice, usd(25), 1).await;
    seed_donation(&engine, alice, usd(40), 3).await;
    seed_expenditure(&engine, usd(30), 2).await;
    seed_expenditure(&engine, usd(50), 4).await;

    let first = engine.run_matching().await.unwrap();
    assert!(!first.is_empty());
    let ledger_after_first = engine.matches().await.unwrap();

    let second = engine.run_matching().await.unwrap();
    assert!(second.is_empty());
    assert_eq!(engine.matches().await.unwrap(), ledger_after_first);
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn existing_matches_are_never_revised_by_backdated_donations() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;
    let bob = donor(&engine, "Bob").await;

    let late = seed_donation(&engine, alice, usd(40), 5).await;
    seed_expenditure(&engine, usd(40), 6).await;
    let first = engine.run_matching().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].donation_id, late);

    // A backdated donation would win under strict global FIFO. The engine
    // keeps the audit trail instead: no new matches, the old one untouched.
    let backdated = engine
        .record_donation(NewDonation::new(bob, usd(40), day(1)))
        .await
        .unwrap();
    assert!(completed(backdated.matching).is_empty());
    let ledger = engine.matches().await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].id, first[0].id);
    assert_eq!(ledger[0].donation_id, late);
    assert_eq!(ledger[0].allocated, usd(40));
    assert_eq!(
        engine.donation_remaining(backdated.record.id).await.unwrap(),
        usd(40)
    );

    // The backdated funds go to the next expenditure that needs money.
    let next = engine
        .record_expenditure(NewExpenditure::new(usd(15), "Transport", day(7)))
        .await
        .unwrap();
    let created = completed(next.matching);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].donation_id, backdated.record.id);
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn cents_survive_many_partial_allocations() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;
    let donation = seed_donation(&engine, alice, MoneyCents::new(100_01), 1).await;
    for _ in 0..7 {
        seed_expenditure(&engine, MoneyCents::new(14_29), 2).await;
    }

    let created = engine.run_matching().await.unwrap();
    let total: MoneyCents = created.iter().map(|m| m.allocated).sum();
    assert_eq!(total, MoneyCents::new(100_01));
    assert_eq!(
        engine.donation_remaining(donation).await.unwrap(),
        MoneyCents::ZERO
    );
    // 7 × 14.29 = 100.03, so the last expenditure is short by two cents.
    let mut shortfall = MoneyCents::ZERO;
    for m in &created {
        shortfall += engine.expenditure_remaining(m.expenditure_id).await.unwrap();
    }
    assert_eq!(shortfall, MoneyCents::new(2));
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn invalid_inserts_are_rejected_before_matching() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;

    let zero = engine
        .record_donation(NewDonation::new(alice, MoneyCents::ZERO, day(1)))
        .await
        .unwrap_err();
    assert!(matches!(zero, engine::EngineError::Validation(_)));

    let negative = engine
        .record_expenditure(NewExpenditure::new(MoneyCents::new(-500), "Rent", day(1)))
        .await
        .unwrap_err();
    assert!(matches!(negative, engine::EngineError::Validation(_)));

    let unknown_donor = engine
        .record_donation(NewDonation::new(uuid::Uuid::new_v4(), usd(5), day(1)))
        .await
        .unwrap_err();
    assert!(matches!(unknown_donor, engine::EngineError::Validation(_)));

    let blank_cause = engine
        .record_expenditure(NewExpenditure::new(usd(5), "   ", day(1)))
        .await
        .unwrap_err();
    assert!(matches!(blank_cause, engine::EngineError::Validation(_)));

    assert!(engine.matches().await.unwrap().is_empty());
}

#[tokio::test]
async fn mixed_ledger_keeps_every_invariant() {
    let (engine, _db) = engine_with_db().await;
    let donors = [
        donor(&engine, "Alice").await,
        donor(&engine, "Bob").await,
        donor(&engine, "Carol").await,
    ];

    let amounts = [17_50, 3_01, 250_00, 42_42, 9_99, 120_00, 75, 64_10];
    for (i, cents) in amounts.iter().enumerate() {
        let at = 1 + (i as u32 * 3) % 20;
        engine
            .record_donation(NewDonation::new(donors[i % 3], MoneyCents::new(*cents), day(at)))
            .await
            .unwrap();
        engine
            .record_expenditure(NewExpenditure::new(
                MoneyCents::new(*cents / 2 + 1_00),
                "Programs",
                day(at + 1),
            ))
            .await
            .unwrap();
        assert_ledger_invariants(&engine).await;
    }

    assert!(engine.run_matching().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_triggers_on_one_engine_never_double_allocate() {
    let (engine, _db) = engine_with_db().await;
    let alice = donor(&engine, "Alice").await;
    let donation = seed_donation(&engine, alice, usd(100), 1).await;

    let (left, right) = tokio::join!(
        engine.record_expenditure(NewExpenditure::new(usd(70), "Roof", day(2))),
        engine.record_expenditure(NewExpenditure::new(usd(70), "Well", day(2))),
    );
    let left = left.unwrap();
    let right = right.unwrap();
    assert!(matches!(left.matching, PassOutcome::Completed(_)));
    assert!(matches!(right.matching, PassOutcome::Completed(_)));

    assert_eq!(
        engine.donation_remaining(donation).await.unwrap(),
        MoneyCents::ZERO
    );
    let funded = engine.expenditure_remaining(left.record.id).await.unwrap()
        + engine.expenditure_remaining(right.record.id).await.unwrap();
    assert_eq!(funded, usd(40));
    assert_ledger_invariants(&engine).await;
}

#[tokio::test]
async fn concurrent_engines_over_one_database_stay_within_caps() {
    let db = db().await;
    let first = engine_on(&db);
    let second = engine_on(&db);
    let alice = donor(&first, "Alice").await;
    let bob = donor(&first, "Bob").await;
    seed_donation(&first, alice, usd(60), 1).await;
    seed_donation(&first, bob, usd(60), 1).await;

    let (a, b) = tokio::join!(
        first.record_expenditure(NewExpenditure::new(usd(80), "School", day(3))),
        second.record_expenditure(NewExpenditure::new(usd(80), "Clinic", day(3))),
    );
    a.unwrap();
    b.unwrap();

    // Any pass that lost a race is redone by this one.
    first.run_matching().await.unwrap();

    let total: MoneyCents = first
        .matches()
        .await
        .unwrap()
        .iter()
        .map(|m| m.allocated)
        .sum();
    assert_eq!(total, usd(120));
    assert_ledger_invariants(&first).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_trigger_schedules_the_pass() {
    let db = db().await;
    let engine = engine::Engine::builder()
        .database(db.clone())
        .matching(fast_retries())
        .trigger(engine::TriggerMode::Background)
        .build()
        .unwrap();
    let alice = donor(&engine, "Alice").await;

    let donation = engine
        .record_donation(NewDonation::new(alice, usd(20), day(1)))
        .await
        .unwrap();
    assert_eq!(donation.matching, PassOutcome::Scheduled);
    let expenditure = engine
        .record_expenditure(NewExpenditure::new(usd(20), "Books", day(2)))
        .await
        .unwrap();
    assert_eq!(expenditure.matching, PassOutcome::Scheduled);

    let mut ledger = Vec::new();
    for _ in 0..200 {
        ledger = engine.matches().await.unwrap();
        if !ledger.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].allocated, usd(20));
    assert_eq!(ledger[0].expenditure_id, expenditure.record.id);
}
