//! Matches (allocations).
//!
//! A [`Match`] links part of a donation to part of an expenditure. Matches are
//! only ever created by the matching pass and form the append-only audit
//! trail of where each dollar went.
//!
//! Every stored match satisfies:
//! - `allocated > 0`
//! - `donation.donated_at <= expenditure.spent_at`
//! - per donation and per expenditure, the allocated sum stays within the
//!   record's amount
//!
//! At most one row exists per `(donation_id, expenditure_id)` pair.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub expenditure_id: Uuid,
    pub allocated: MoneyCents,
    pub created_at: DateTime<Utc>,
}

/// A match the store is asked to commit.
///
/// `expected_*_allocated` are the allocation sums the planner assumed when it
/// computed `amount`. The store re-reads both sums inside the commit and
/// refuses the write with `ConcurrencyConflict` if either one moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewMatch {
    pub donation_id: Uuid,
    pub expenditure_id: Uuid,
    pub amount: MoneyCents,
    pub expected_donation_allocated: MoneyCents,
    pub expected_expenditure_allocated: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub donation_id: String,
    pub expenditure_id: String,
    pub allocated_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donations::Entity",
        from = "Column::DonationId",
        to = "super::donations::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Donations,
    #[sea_orm(
        belongs_to = "super::expenditures::Entity",
        from = "Column::ExpenditureId",
        to = "super::expenditures::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Expenditures,
}

impl Related<super::donations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl Related<super::expenditures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenditures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Match> for ActiveModel {
    fn from(value: &Match) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            donation_id: ActiveValue::Set(value.donation_id.to_string()),
            expenditure_id: ActiveValue::Set(value.expenditure_id.to_string()),
            allocated_minor: ActiveValue::Set(value.allocated.cents()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Match {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "match")?,
            donation_id: parse_uuid(&model.donation_id, "donation")?,
            expenditure_id: parse_uuid(&model.expenditure_id, "expenditure")?,
            allocated: MoneyCents::new(model.allocated_minor),
            created_at: model.created_at,
        })
    }
}
