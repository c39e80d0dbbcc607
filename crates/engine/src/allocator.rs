//! The matching algorithm.
//!
//! [`plan`] is pure: it takes the current balances of every donation and the
//! outstanding need of every expenditure and returns the allocations a pass
//! should commit. It never touches storage and never revises existing
//! matches.
//!
//! Expenditures are funded oldest first. Each one draws from donations dated
//! on or before its `spent_at`, oldest donation first, skipping donations
//! that are already exhausted. Ordering is FIFO only among funds that are
//! still unallocated when the pass runs: a backdated donation recorded after
//! a later one was consumed does not displace the existing allocation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MoneyCents, NewMatch};

/// A donation as the planner sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DonationBalance {
    pub donation_id: Uuid,
    pub donated_at: DateTime<Utc>,
    pub amount: MoneyCents,
    /// Sum already allocated by committed matches.
    pub allocated: MoneyCents,
}

impl DonationBalance {
    #[must_use]
    pub fn remaining(&self) -> MoneyCents {
        self.amount.saturating_remaining(self.allocated)
    }
}

/// An expenditure as the planner sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpenditureNeed {
    pub expenditure_id: Uuid,
    pub spent_at: DateTime<Utc>,
    pub amount: MoneyCents,
    /// Sum already funded by committed matches.
    pub allocated: MoneyCents,
}

impl ExpenditureNeed {
    #[must_use]
    pub fn remaining(&self) -> MoneyCents {
        self.amount.saturating_remaining(self.allocated)
    }
}

/// Compute the allocations one matching pass should commit, in commit order.
///
/// Inputs are re-sorted by timestamp with a stable sort, so callers can pass
/// the store's total order and keep its tie-breaking. Each returned
/// [`NewMatch`] carries the allocation sums both sides will have right before
/// it is committed, which lets the store detect concurrent writers.
///
/// Cost is O(expenditures × donations) in the worst case.
#[must_use]
pub fn plan(donations: &[DonationBalance], expenditures: &[ExpenditureNeed]) -> Vec<NewMatch> {
    let mut donations = donations.to_vec();
    donations.sort_by_key(|d| d.donated_at);
    let mut expenditures = expenditures.to_vec();
    expenditures.sort_by_key(|e| e.spent_at);

    let mut planned = Vec::new();
    // Everything before this index is exhausted for the rest of the pass.
    let mut first_open = 0;

    for expenditure in &mut expenditures {
        let mut need = expenditure.remaining();
        if need.is_zero() {
            continue;
        }

        while first_open < donations.len() && donations[first_open].remaining().is_zero() {
            first_open += 1;
        }

        for donation in &mut donations[first_open..] {
            if donation.donated_at > expenditure.spent_at {
                break;
            }
            let available = donation.remaining();
            if available.is_zero() {
                continue;
            }

            let amount = available.min(need);
            planned.push(NewMatch {
                donation_id: donation.donation_id,
                expenditure_id: expenditure.expenditure_id,
                amount,
                expected_donation_allocated: donation.allocated,
                expected_expenditure_allocated: expenditure.allocated,
            });
            donation.allocated += amount;
            expenditure.allocated += amount;
            need -= amount;

            if need.is_zero() {
                break;
            }
        }
    }

    planned
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t(day: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::days(day)
    }

    fn donation(day: i64, cents: i64) -> DonationBalance {
        DonationBalance {
            donation_id: Uuid::new_v4(),
            donated_at: t(day),
            amount: MoneyCents::new(cents),
            allocated: MoneyCents::ZERO,
        }
    }

    fn expenditure(day: i64, cents: i64) -> ExpenditureNeed {
        ExpenditureNeed {
            expenditure_id: Uuid::new_v4(),
            spent_at: t(day),
            amount: MoneyCents::new(cents),
            allocated: MoneyCents::ZERO,
        }
    }

    /// Feed planned matches back into the balances, like a committed pass.
    fn apply(
        donations: &mut [DonationBalance],
        expenditures: &mut [ExpenditureNeed],
        planned: &[NewMatch],
    ) {
        for m in planned {
            if let Some(d) = donations.iter_mut().find(|d| d.donation_id == m.donation_id) {
                d.allocated += m.amount;
            }
            if let Some(e) = expenditures
                .iter_mut()
                .find(|e| e.expenditure_id == m.expenditure_id)
            {
                e.allocated += m.amount;
            }
        }
    }

    #[test]
    fn single_donation_partially_funds_expenditure() {
        let d = donation(1, 100_00);
        let e = expenditure(2, 60_00);
        let planned = plan(&[d], &[e]);

        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].amount, MoneyCents::new(60_00));
        assert_eq!(planned[0].donation_id, d.donation_id);

        let mut donations = [d];
        let mut expenditures = [e];
        apply(&mut donations, &mut expenditures, &planned);
        assert_eq!(donations[0].remaining(), MoneyCents::new(40_00));
    }

    #[test]
    fn earlier_donation_is_consumed_first() {
        let first = donation(1, 50_00);
        let second = donation(2, 50_00);
        let e = expenditure(3, 80_00);
        // Deliberately out of order: the planner sorts.
        let planned = plan(&[second, first], &[e]);

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].donation_id, first.donation_id);
        assert_eq!(planned[0].amount, MoneyCents::new(50_00));
        assert_eq!(planned[1].donation_id, second.donation_id);
        assert_eq!(planned[1].amount, MoneyCents::new(30_00));
    }

    #[test]
    fn expenditure_waits_for_an_eligible_donation() {
        let e = expenditure(1, 100_00);
        assert!(plan(&[], &[e]).is_empty());

        let later = donation(2, 100_00);
        assert!(plan(&[later], &[e]).is_empty());

        let same_instant = donation(1, 100_00);
        let planned = plan(&[later, same_instant], &[e]);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].donation_id, same_instant.donation_id);
    }

    #[test]
    fn second_pass_without_inserts_plans_nothing() {
        let mut donations = [donation(1, 25_00), donation(2, 10_00), donation(5, 70_00)];
        let mut expenditures = [expenditure(3, 30_00), expenditure(6, 90_00)];

        let first = plan(&donations, &expenditures);
        assert!(!first.is_empty());
        apply(&mut donations, &mut expenditures, &first);

        assert!(plan(&donations, &expenditures).is_empty());
    }

    #[test]
    fn one_donation_funds_several_expenditures_in_time_order() {
        let d = donation(0, 100_00);
        let late = expenditure(5, 70_00);
        let early = expenditure(2, 50_00);
        let planned = plan(&[d], &[late, early]);

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].expenditure_id, early.expenditure_id);
        assert_eq!(planned[0].amount, MoneyCents::new(50_00));
        assert_eq!(planned[1].expenditure_id, late.expenditure_id);
        assert_eq!(planned[1].amount, MoneyCents::new(50_00));
    }

    #[test]
    fn expected_sums_chain_within_a_pass() {
        let d = DonationBalance {
            allocated: MoneyCents::new(10_00),
            ..donation(0, 100_00)
        };
        let a = expenditure(1, 30_00);
        let b = ExpenditureNeed {
            allocated: MoneyCents::new(5_00),
            ..expenditure(2, 20_00)
        };
        let planned = plan(&[d], &[a, b]);

        assert_eq!(planned[0].expected_donation_allocated, MoneyCents::new(10_00));
        assert_eq!(planned[0].expected_expenditure_allocated, MoneyCents::ZERO);
        assert_eq!(planned[1].expected_donation_allocated, MoneyCents::new(40_00));
        assert_eq!(planned[1].expected_expenditure_allocated, MoneyCents::new(5_00));
        assert_eq!(planned[1].amount, MoneyCents::new(15_00));
    }

    #[test]
    fn never_exceeds_either_cap_and_never_emits_zero() {
        let mut donations = [
            donation(0, 33_33),
            donation(1, 1),
            donation(1, 12_50),
            donation(4, 99_99),
        ];
        let mut expenditures = [
            expenditure(1, 20_00),
            expenditure(2, 40_00),
            expenditure(4, 2),
            expenditure(9, 500_00),
        ];
        let planned = plan(&donations, &expenditures);
        assert!(planned.iter().all(|m| m.amount.is_positive()));
        apply(&mut donations, &mut expenditures, &planned);

        assert!(donations.iter().all(|d| d.allocated <= d.amount));
        assert!(expenditures.iter().all(|e| e.allocated <= e.amount));
        // Everything available got spent: total demand exceeds total supply.
        let supplied: MoneyCents = donations.iter().map(|d| d.amount).sum();
        let spent: MoneyCents = planned.iter().map(|m| m.amount).sum();
        assert_eq!(supplied, spent);
    }

    #[test]
    fn funded_pairs_respect_chronology() {
        let donations = [donation(3, 10_00), donation(1, 10_00), donation(6, 10_00)];
        let expenditures = [expenditure(2, 15_00), expenditure(5, 15_00)];
        let planned = plan(&donations, &expenditures);

        for m in &planned {
            let d = donations.iter().find(|d| d.donation_id == m.donation_id).unwrap();
            let e = expenditures
                .iter()
                .find(|e| e.expenditure_id == m.expenditure_id)
                .unwrap();
            assert!(d.donated_at <= e.spent_at);
        }
    }

    #[test]
    fn backdated_donation_does_not_displace_consumed_funds() {
        // Pass 1: a day-5 donation funds a day-6 expenditure entirely.
        let mut donations = vec![donation(5, 40_00)];
        let mut expenditures = vec![expenditure(6, 40_00)];
        let first = plan(&donations, &expenditures);
        apply(&mut donations, &mut expenditures, &first);

        // A donation dated day 1 arrives afterwards. Strict global FIFO would
        // prefer it, but the existing match stands and nothing new is planned.
        donations.push(donation(1, 40_00));
        assert!(plan(&donations, &expenditures).is_empty());

        // It funds the next expenditure instead.
        let next = expenditure(7, 10_00);
        expenditures.push(next);
        let planned = plan(&donations, &expenditures);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].donation_id, donations[1].donation_id);
    }
}
