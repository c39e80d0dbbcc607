use uuid::Uuid;

use crate::{Dashboard, Donor, NewDonor, ResultEngine, dashboard};

use super::Engine;

impl Engine {
    /// Register a new donor.
    pub async fn new_donor(&self, cmd: NewDonor) -> ResultEngine<Donor> {
        let donor = self.store.create_donor(cmd).await?;
        tracing::info!(donor_id = %donor.id, "donor created");
        Ok(donor)
    }

    /// Update the donor's contact email (`None` clears it).
    pub async fn update_donor_contact(
        &self,
        donor_id: Uuid,
        email: Option<&str>,
    ) -> ResultEngine<Donor> {
        self.store.update_donor_contact(donor_id, email).await
    }

    pub async fn donor(&self, donor_id: Uuid) -> ResultEngine<Donor> {
        self.store.donor(donor_id).await
    }

    /// Total giving and per-expenditure contributions for a donor.
    pub async fn dashboard(&self, donor_id: Uuid) -> ResultEngine<Dashboard> {
        dashboard::build(self.store.as_ref(), donor_id).await
    }
}
