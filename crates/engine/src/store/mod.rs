//! Ledger storage.
//!
//! [`LedgerStore`] is the only way the engine touches persisted state. The
//! engine receives it explicitly (see `EngineBuilder::store`), so tests and
//! alternative backends can swap it out.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    Donation, Donor, Expenditure, Match, Media, MoneyCents, NewDonation, NewDonor,
    NewExpenditure, NewMatch, NewMedia, ResultEngine,
};

mod database;

pub use database::DatabaseLedger;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Durable, transactional storage for donors, donations, expenditures,
/// matches and expenditure media.
///
/// Every list is returned in a total order: timestamp first, then the
/// recording time, then id.
#[async_trait]
pub trait LedgerStore: Send + Sync + fmt::Debug {
    async fn create_donor(&self, cmd: NewDonor) -> ResultEngine<Donor>;

    /// Replace the donor's contact email. `None` clears it.
    async fn update_donor_contact(&self, donor_id: Uuid, email: Option<&str>)
    -> ResultEngine<Donor>;

    /// Fails with `Validation` for non-positive amounts or unknown donors.
    async fn create_donation(&self, cmd: NewDonation) -> ResultEngine<Donation>;

    async fn create_expenditure(&self, cmd: NewExpenditure) -> ResultEngine<Expenditure>;

    async fn add_media(&self, cmd: NewMedia) -> ResultEngine<Media>;

    /// Atomically check and commit one allocation.
    ///
    /// - `ConcurrencyConflict` if either side's allocated sum differs from the
    ///   one the caller planned against.
    /// - `InvariantViolation` if the commit would exceed a cap, allocate a
    ///   non-positive amount, or fund an expenditure with a later donation.
    ///
    /// A second allocation for an existing pair increases that pair's row.
    async fn create_match(&self, cmd: NewMatch) -> ResultEngine<Match>;

    async fn list_donations_ordered_by_time(&self) -> ResultEngine<Vec<Donation>>;

    async fn list_expenditures_ordered_by_time(&self) -> ResultEngine<Vec<Expenditure>>;

    async fn sum_allocated_for_donation(&self, donation_id: Uuid) -> ResultEngine<MoneyCents>;

    async fn sum_allocated_for_expenditure(
        &self,
        expenditure_id: Uuid,
    ) -> ResultEngine<MoneyCents>;

    async fn list_matches_for_donor(&self, donor_id: Uuid) -> ResultEngine<Vec<Match>>;

    /// Full match ledger in commit order.
    async fn list_matches(&self) -> ResultEngine<Vec<Match>>;

    async fn donor(&self, donor_id: Uuid) -> ResultEngine<Donor>;

    async fn donation(&self, donation_id: Uuid) -> ResultEngine<Donation>;

    async fn expenditure(&self, expenditure_id: Uuid) -> ResultEngine<Expenditure>;

    async fn list_donations_for_donor(&self, donor_id: Uuid) -> ResultEngine<Vec<Donation>>;

    async fn list_media_for_expenditure(&self, expenditure_id: Uuid)
    -> ResultEngine<Vec<Media>>;
}
