use uuid::Uuid;

use crate::{
    Donation, Expenditure, Media, NewDonation, NewExpenditure, NewMedia, PassOutcome,
    ResultEngine,
};

use super::Engine;

/// A committed insert plus the matching pass it triggered.
#[derive(Debug)]
pub struct Recorded<T> {
    pub record: T,
    pub matching: PassOutcome,
}

impl Engine {
    /// Record a donation, then trigger a matching pass.
    ///
    /// Validation errors are returned before anything is written. Once the
    /// donation is stored the call succeeds even if the pass fails; the
    /// failure is reported in [`Recorded::matching`].
    pub async fn record_donation(&self, cmd: NewDonation) -> ResultEngine<Recorded<Donation>> {
        let donation = self.store.create_donation(cmd).await?;
        tracing::info!(
            donation_id = %donation.id,
            donor_id = %donation.donor_id,
            amount = %donation.amount,
            "donation recorded"
        );
        let matching = self.coordinator.trigger(self.trigger).await;
        Ok(Recorded {
            record: donation,
            matching,
        })
    }

    /// Record an expenditure, then trigger a matching pass.
    pub async fn record_expenditure(
        &self,
        cmd: NewExpenditure,
    ) -> ResultEngine<Recorded<Expenditure>> {
        let expenditure = self.store.create_expenditure(cmd).await?;
        tracing::info!(
            expenditure_id = %expenditure.id,
            amount = %expenditure.amount,
            cause = %expenditure.cause,
            "expenditure recorded"
        );
        let matching = self.coordinator.trigger(self.trigger).await;
        Ok(Recorded {
            record: expenditure,
            matching,
        })
    }

    pub async fn attach_media(&self, cmd: NewMedia) -> ResultEngine<Media> {
        self.store.add_media(cmd).await
    }

    pub async fn media(&self, expenditure_id: Uuid) -> ResultEngine<Vec<Media>> {
        self.store.expenditure(expenditure_id).await?;
        self.store.list_media_for_expenditure(expenditure_id).await
    }

    pub async fn donation(&self, donation_id: Uuid) -> ResultEngine<Donation> {
        self.store.donation(donation_id).await
    }

    pub async fn expenditure(&self, expenditure_id: Uuid) -> ResultEngine<Expenditure> {
        self.store.expenditure(expenditure_id).await
    }
}
