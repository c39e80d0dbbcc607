//! Donor dashboard: how much a donor gave and where it went.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Donor, EngineError, Expenditure, Match, Media, MoneyCents, ResultEngine, store::LedgerStore,
};

/// Funds from one donor that reached one expenditure, summed over all of the
/// donor's donations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub expenditure: Expenditure,
    pub allocated: MoneyCents,
    pub media: Vec<Media>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub donor: Donor,
    /// Sum of every donation, allocated or not.
    pub total_donated: MoneyCents,
    /// Sum of every contribution.
    pub total_allocated: MoneyCents,
    /// Ordered by the expenditure's `spent_at`.
    pub contributions: Vec<Contribution>,
}

impl Dashboard {
    /// `true` when the donor gave money that no expenditure has used yet.
    ///
    /// Lets callers tell "gave nothing" apart from "gave, not yet allocated".
    #[must_use]
    pub fn has_unallocated_funds(&self) -> bool {
        self.total_donated > self.total_allocated
    }
}

fn overflow(donor_id: Uuid, what: &str) -> EngineError {
    EngineError::Validation(format!("{what} of donor {donor_id} exceeds the representable amount"))
}

/// Sum allocations per expenditure, keeping first-seen order.
///
/// Returns `None` if any per-expenditure total overflows.
fn sum_by_expenditure(matches: &[Match]) -> Option<Vec<(Uuid, MoneyCents)>> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut totals: Vec<(Uuid, MoneyCents)> = Vec::new();
    for m in matches {
        match index.get(&m.expenditure_id) {
            Some(&at) => totals[at].1 = totals[at].1.checked_add(m.allocated)?,
            None => {
                index.insert(m.expenditure_id, totals.len());
                totals.push((m.expenditure_id, m.allocated));
            }
        }
    }
    Some(totals)
}

/// Build the dashboard for `donor_id` from the ledger. Read-only.
///
/// Fails with `NotFound` if the donor does not exist.
pub async fn build(store: &dyn LedgerStore, donor_id: Uuid) -> ResultEngine<Dashboard> {
    let donor = store.donor(donor_id).await?;
    let donations = store.list_donations_for_donor(donor_id).await?;
    let total_donated = MoneyCents::checked_sum(donations.iter().map(|d| d.amount))
        .ok_or_else(|| overflow(donor_id, "total donated"))?;

    let matches = store.list_matches_for_donor(donor_id).await?;
    let per_expenditure =
        sum_by_expenditure(&matches).ok_or_else(|| overflow(donor_id, "total allocated"))?;
    let total_allocated = MoneyCents::checked_sum(per_expenditure.iter().map(|(_, a)| *a))
        .ok_or_else(|| overflow(donor_id, "total allocated"))?;

    let mut contributions = Vec::new();
    for (expenditure_id, allocated) in per_expenditure {
        contributions.push(Contribution {
            expenditure: store.expenditure(expenditure_id).await?,
            allocated,
            media: store.list_media_for_expenditure(expenditure_id).await?,
        });
    }
    contributions.sort_by(|a, b| {
        a.expenditure
            .spent_at
            .cmp(&b.expenditure.spent_at)
            .then(a.expenditure.recorded_at.cmp(&b.expenditure.recorded_at))
            .then(a.expenditure.id.cmp(&b.expenditure.id))
    });

    tracing::debug!(
        %donor_id,
        contributions = contributions.len(),
        "dashboard built"
    );

    Ok(Dashboard {
        donor,
        total_donated,
        total_allocated,
        contributions,
    })
}
