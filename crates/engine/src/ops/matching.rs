use uuid::Uuid;

use crate::{Match, MoneyCents, ResultEngine};

use super::Engine;

impl Engine {
    /// Run a matching pass now, regardless of the configured trigger mode.
    pub async fn run_matching(&self) -> ResultEngine<Vec<Match>> {
        self.coordinator.run_matching().await
    }

    /// The whole match ledger in commit order.
    pub async fn matches(&self) -> ResultEngine<Vec<Match>> {
        self.store.list_matches().await
    }

    /// Part of the donation not yet allocated to any expenditure.
    pub async fn donation_remaining(&self, donation_id: Uuid) -> ResultEngine<MoneyCents> {
        let donation = self.store.donation(donation_id).await?;
        let allocated = self.store.sum_allocated_for_donation(donation_id).await?;
        Ok(donation.amount.saturating_remaining(allocated))
    }

    /// Part of the expenditure not yet funded by any donation.
    pub async fn expenditure_remaining(&self, expenditure_id: Uuid) -> ResultEngine<MoneyCents> {
        let expenditure = self.store.expenditure(expenditure_id).await?;
        let allocated = self
            .store
            .sum_allocated_for_expenditure(expenditure_id)
            .await?;
        Ok(expenditure.amount.saturating_remaining(allocated))
    }
}
