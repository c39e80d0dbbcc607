//! Donations.
//!
//! A [`Donation`] is a credit of funds available from `donated_at` onward.
//! Amount and timestamp never change once recorded.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::ensure_positive_amount, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub amount: MoneyCents,
    pub donated_at: DateTime<Utc>,
    /// When the ledger accepted the row. Breaks ties between equal
    /// `donated_at` values.
    pub recorded_at: DateTime<Utc>,
}

impl Donation {
    pub fn new(
        donor_id: Uuid,
        amount: MoneyCents,
        donated_at: DateTime<Utc>,
        recorded_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        ensure_positive_amount(amount, "donation")?;
        Ok(Self {
            id: Uuid::new_v4(),
            donor_id,
            amount,
            donated_at,
            recorded_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub donor_id: String,
    pub amount_minor: i64,
    pub donated_at: DateTimeUtc,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donors::Entity",
        from = "Column::DonorId",
        to = "super::donors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Donors,
    #[sea_orm(has_many = "super::matches::Entity")]
    Matches,
}

impl Related<super::donors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donors.def()
    }
}

impl Related<super::matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Donation> for ActiveModel {
    fn from(donation: &Donation) -> Self {
        Self {
            id: ActiveValue::Set(donation.id.to_string()),
            donor_id: ActiveValue::Set(donation.donor_id.to_string()),
            amount_minor: ActiveValue::Set(donation.amount.cents()),
            donated_at: ActiveValue::Set(donation.donated_at),
            recorded_at: ActiveValue::Set(donation.recorded_at),
        }
    }
}

impl TryFrom<Model> for Donation {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "donation")?,
            donor_id: parse_uuid(&model.donor_id, "donor")?,
            amount: MoneyCents::new(model.amount_minor),
            donated_at: model.donated_at,
            recorded_at: model.recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn rejects_non_positive_amount() {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        let err = Donation::new(Uuid::new_v4(), MoneyCents::ZERO, at, at).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn model_round_trip_keeps_cents() {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let donation = Donation::new(Uuid::new_v4(), MoneyCents::new(10_001), at, at).unwrap();
        let model = Model {
            id: donation.id.to_string(),
            donor_id: donation.donor_id.to_string(),
            amount_minor: 10_001,
            donated_at: at,
            recorded_at: at,
        };
        assert_eq!(Donation::try_from(model).unwrap(), donation);
    }
}
