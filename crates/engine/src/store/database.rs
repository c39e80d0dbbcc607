use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, DatabaseTransaction, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Donation, Donor, EngineError, Expenditure, Match, Media, MoneyCents, NewDonation, NewDonor,
    NewExpenditure, NewMatch, NewMedia, ResultEngine, donations, donors, expenditures, matches,
    media,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{LedgerStore, with_tx};

const DONATION_ALLOCATED_SQL: &str =
    "SELECT COALESCE(SUM(allocated_minor), 0) AS sum FROM matches WHERE donation_id = ?;";
const EXPENDITURE_ALLOCATED_SQL: &str =
    "SELECT COALESCE(SUM(allocated_minor), 0) AS sum FROM matches WHERE expenditure_id = ?;";

/// [`LedgerStore`] backed by a sea-orm connection (sqlite in production).
///
/// Each `create_match` runs in its own database transaction: the cap checks
/// and the insert either commit together or not at all, and no transaction
/// spans more than one match.
#[derive(Clone, Debug)]
pub struct DatabaseLedger {
    database: DatabaseConnection,
}

impl DatabaseLedger {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.database
    }

    async fn allocated_sum<C: ConnectionTrait>(
        db: &C,
        sql: &str,
        id: Uuid,
    ) -> ResultEngine<MoneyCents> {
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            sql,
            vec![id.to_string().into()],
        );
        // Only a missing row reads as zero. A row that fails to decode is an error.
        let cents = db
            .query_one(stmt)
            .await?
            .map(|r| r.try_get::<i64>("", "sum"))
            .transpose()?
            .unwrap_or(0);
        Ok(MoneyCents::new(cents))
    }

    async fn find_donation<C: ConnectionTrait>(db: &C, donation_id: Uuid) -> ResultEngine<Donation> {
        donations::Entity::find_by_id(donation_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("donation {donation_id}")))?
            .try_into()
    }

    async fn find_expenditure<C: ConnectionTrait>(
        db: &C,
        expenditure_id: Uuid,
    ) -> ResultEngine<Expenditure> {
        expenditures::Entity::find_by_id(expenditure_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("expenditure {expenditure_id}")))?
            .try_into()
    }

    /// Body of `create_match`, run inside `db_tx`.
    async fn commit_match(&self, db_tx: &DatabaseTransaction, cmd: NewMatch) -> ResultEngine<Match> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvariantViolation(format!(
                "allocation must be > 0, got {}",
                cmd.amount
            )));
        }

        let donation = Self::find_donation(db_tx, cmd.donation_id).await?;
        let expenditure = Self::find_expenditure(db_tx, cmd.expenditure_id).await?;
        if donation.donated_at > expenditure.spent_at {
            return Err(EngineError::InvariantViolation(format!(
                "donation {} is dated after expenditure {}",
                donation.id, expenditure.id
            )));
        }

        let donation_allocated =
            Self::allocated_sum(db_tx, DONATION_ALLOCATED_SQL, donation.id).await?;
        let expenditure_allocated =
            Self::allocated_sum(db_tx, EXPENDITURE_ALLOCATED_SQL, expenditure.id).await?;

        if donation_allocated != cmd.expected_donation_allocated
            || expenditure_allocated != cmd.expected_expenditure_allocated
        {
            return Err(EngineError::ConcurrencyConflict(format!(
                "allocations moved since planning (donation {}: {} -> {}, expenditure {}: {} -> {})",
                donation.id,
                cmd.expected_donation_allocated,
                donation_allocated,
                expenditure.id,
                cmd.expected_expenditure_allocated,
                expenditure_allocated
            )));
        }

        let overflow = || EngineError::InvariantViolation("allocation sum overflow".to_string());
        let donation_total = donation_allocated
            .checked_add(cmd.amount)
            .ok_or_else(overflow)?;
        if donation_total > donation.amount {
            return Err(EngineError::InvariantViolation(format!(
                "donation {} would be allocated {donation_total} of {}",
                donation.id, donation.amount
            )));
        }
        let expenditure_total = expenditure_allocated
            .checked_add(cmd.amount)
            .ok_or_else(overflow)?;
        if expenditure_total > expenditure.amount {
            return Err(EngineError::InvariantViolation(format!(
                "expenditure {} would be funded {expenditure_total} of {}",
                expenditure.id, expenditure.amount
            )));
        }

        let existing = matches::Entity::find()
            .filter(matches::Column::DonationId.eq(donation.id.to_string()))
            .filter(matches::Column::ExpenditureId.eq(expenditure.id.to_string()))
            .one(db_tx)
            .await?;

        match existing {
            Some(model) => {
                let allocated = MoneyCents::new(model.allocated_minor) + cmd.amount;
                tracing::warn!(
                    donation_id = %donation.id,
                    expenditure_id = %expenditure.id,
                    %allocated,
                    "topping up existing match for the same pair"
                );
                let mut active: matches::ActiveModel = model.into();
                active.allocated_minor = ActiveValue::Set(allocated.cents());
                let updated = active.update(db_tx).await?;
                Match::try_from(updated)
            }
            None => {
                let new_match = Match {
                    id: Uuid::new_v4(),
                    donation_id: donation.id,
                    expenditure_id: expenditure.id,
                    allocated: cmd.amount,
                    created_at: Utc::now(),
                };
                matches::ActiveModel::from(&new_match).insert(db_tx).await?;
                Ok(new_match)
            }
        }
    }
}

fn collect<M, T>(models: Vec<M>) -> ResultEngine<Vec<T>>
where
    T: TryFrom<M, Error = EngineError>,
{
    models.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl LedgerStore for DatabaseLedger {
    async fn create_donor(&self, cmd: NewDonor) -> ResultEngine<Donor> {
        let name = normalize_required_text(&cmd.name, "donor name")?;
        let donor = Donor::new(name, normalize_optional_text(cmd.email.as_deref()), Utc::now());
        donors::ActiveModel::from(&donor)
            .insert(&self.database)
            .await?;
        Ok(donor)
    }

    async fn update_donor_contact(
        &self,
        donor_id: Uuid,
        email: Option<&str>,
    ) -> ResultEngine<Donor> {
        let email = normalize_optional_text(email);
        with_tx!(self, |db_tx| {
            match donors::Entity::find_by_id(donor_id.to_string())
                .one(&db_tx)
                .await?
            {
                Some(model) => {
                    let mut active: donors::ActiveModel = model.into();
                    active.email = ActiveValue::Set(email);
                    let updated = active.update(&db_tx).await?;
                    Donor::try_from(updated)
                }
                None => Err(EngineError::NotFound(format!("donor {donor_id}"))),
            }
        })
    }

    async fn create_donation(&self, cmd: NewDonation) -> ResultEngine<Donation> {
        let donation = Donation::new(cmd.donor_id, cmd.amount, cmd.donated_at, Utc::now())?;
        with_tx!(self, |db_tx| {
            let donor = donors::Entity::find_by_id(cmd.donor_id.to_string())
                .one(&db_tx)
                .await?;
            if donor.is_none() {
                Err(EngineError::Validation(format!(
                    "donation references unknown donor {}",
                    cmd.donor_id
                )))
            } else {
                donations::ActiveModel::from(&donation)
                    .insert(&db_tx)
                    .await?;
                Ok(donation)
            }
        })
    }

    async fn create_expenditure(&self, cmd: NewExpenditure) -> ResultEngine<Expenditure> {
        let cause = normalize_required_text(&cmd.cause, "cause")?;
        let expenditure = Expenditure::new(
            cmd.amount,
            cause,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.spent_at,
            Utc::now(),
        )?;
        expenditures::ActiveModel::from(&expenditure)
            .insert(&self.database)
            .await?;
        Ok(expenditure)
    }

    async fn add_media(&self, cmd: NewMedia) -> ResultEngine<Media> {
        let url = normalize_required_text(&cmd.url, "media url")?;
        with_tx!(self, |db_tx| {
            Self::find_expenditure(&db_tx, cmd.expenditure_id).await?;
            let existing = media::Entity::find()
                .filter(media::Column::ExpenditureId.eq(cmd.expenditure_id.to_string()))
                .count(&db_tx)
                .await?;
            let position = i32::try_from(existing)
                .map_err(|_| EngineError::Validation("too many media entries".to_string()))?;
            let entry = Media {
                id: Uuid::new_v4(),
                expenditure_id: cmd.expenditure_id,
                kind: cmd.kind,
                url,
                position,
            };
            media::ActiveModel::from(&entry).insert(&db_tx).await?;
            Ok(entry)
        })
    }

    async fn create_match(&self, cmd: NewMatch) -> ResultEngine<Match> {
        with_tx!(self, |db_tx| { self.commit_match(&db_tx, cmd).await })
    }

    async fn list_donations_ordered_by_time(&self) -> ResultEngine<Vec<Donation>> {
        let models = donations::Entity::find()
            .order_by_asc(donations::Column::DonatedAt)
            .order_by_asc(donations::Column::RecordedAt)
            .order_by_asc(donations::Column::Id)
            .all(&self.database)
            .await?;
        collect(models)
    }

    async fn list_expenditures_ordered_by_time(&self) -> ResultEngine<Vec<Expenditure>> {
        let models = expenditures::Entity::find()
            .order_by_asc(expenditures::Column::SpentAt)
            .order_by_asc(expenditures::Column::RecordedAt)
            .order_by_asc(expenditures::Column::Id)
            .all(&self.database)
            .await?;
        collect(models)
    }

    async fn sum_allocated_for_donation(&self, donation_id: Uuid) -> ResultEngine<MoneyCents> {
        Self::allocated_sum(&self.database, DONATION_ALLOCATED_SQL, donation_id).await
    }

    async fn sum_allocated_for_expenditure(
        &self,
        expenditure_id: Uuid,
    ) -> ResultEngine<MoneyCents> {
        Self::allocated_sum(&self.database, EXPENDITURE_ALLOCATED_SQL, expenditure_id).await
    }

    async fn list_matches_for_donor(&self, donor_id: Uuid) -> ResultEngine<Vec<Match>> {
        let models = matches::Entity::find()
            .join(JoinType::InnerJoin, matches::Relation::Donations.def())
            .filter(donations::Column::DonorId.eq(donor_id.to_string()))
            .order_by_asc(matches::Column::CreatedAt)
            .order_by_asc(matches::Column::Id)
            .all(&self.database)
            .await?;
        collect(models)
    }

    async fn list_matches(&self) -> ResultEngine<Vec<Match>> {
        let models = matches::Entity::find()
            .order_by_asc(matches::Column::CreatedAt)
            .order_by_asc(matches::Column::Id)
            .all(&self.database)
            .await?;
        collect(models)
    }

    async fn donor(&self, donor_id: Uuid) -> ResultEngine<Donor> {
        donors::Entity::find_by_id(donor_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("donor {donor_id}")))?
            .try_into()
    }

    async fn donation(&self, donation_id: Uuid) -> ResultEngine<Donation> {
        Self::find_donation(&self.database, donation_id).await
    }

    async fn expenditure(&self, expenditure_id: Uuid) -> ResultEngine<Expenditure> {
        Self::find_expenditure(&self.database, expenditure_id).await
    }

    async fn list_donations_for_donor(&self, donor_id: Uuid) -> ResultEngine<Vec<Donation>> {
        let models = donations::Entity::find()
            .filter(donations::Column::DonorId.eq(donor_id.to_string()))
            .order_by_asc(donations::Column::DonatedAt)
            .order_by_asc(donations::Column::RecordedAt)
            .order_by_asc(donations::Column::Id)
            .all(&self.database)
            .await?;
        collect(models)
    }

    async fn list_media_for_expenditure(
        &self,
        expenditure_id: Uuid,
    ) -> ResultEngine<Vec<Media>> {
        let models = media::Entity::find()
            .filter(media::Column::ExpenditureId.eq(expenditure_id.to_string()))
            .order_by_asc(media::Column::Position)
            .order_by_asc(media::Column::Id)
            .all(&self.database)
            .await?;
        collect(models)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;

    use super::*;

    #[tokio::test]
    async fn allocated_sum_without_a_row_is_zero() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let sum = DatabaseLedger::allocated_sum(&db, "SELECT 1 AS sum WHERE ? IS NULL;", Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(sum, MoneyCents::ZERO);
    }

    #[tokio::test]
    async fn allocated_sum_that_does_not_decode_is_an_error() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let err = DatabaseLedger::allocated_sum(
            &db,
            "SELECT 'not a number' AS sum WHERE ? IS NOT NULL;",
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Database(_)), "{err:?}");
    }
}
