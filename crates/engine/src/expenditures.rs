//! Expenditures.
//!
//! An [`Expenditure`] is a debit that must be funded by donations dated on or
//! before `spent_at`. Immutable once recorded.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::ensure_positive_amount, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expenditure {
    pub id: Uuid,
    pub amount: MoneyCents,
    pub cause: String,
    pub description: Option<String>,
    pub spent_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl Expenditure {
    pub fn new(
        amount: MoneyCents,
        cause: String,
        description: Option<String>,
        spent_at: DateTime<Utc>,
        recorded_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        ensure_positive_amount(amount, "expenditure")?;
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            cause,
            description,
            spent_at,
            recorded_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenditures")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount_minor: i64,
    pub cause: String,
    pub description: Option<String>,
    pub spent_at: DateTimeUtc,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::matches::Entity")]
    Matches,
    #[sea_orm(has_many = "super::media::Entity")]
    Media,
}

impl Related<super::matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expenditure> for ActiveModel {
    fn from(expenditure: &Expenditure) -> Self {
        Self {
            id: ActiveValue::Set(expenditure.id.to_string()),
            amount_minor: ActiveValue::Set(expenditure.amount.cents()),
            cause: ActiveValue::Set(expenditure.cause.clone()),
            description: ActiveValue::Set(expenditure.description.clone()),
            spent_at: ActiveValue::Set(expenditure.spent_at),
            recorded_at: ActiveValue::Set(expenditure.recorded_at),
        }
    }
}

impl TryFrom<Model> for Expenditure {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expenditure")?,
            amount: MoneyCents::new(model.amount_minor),
            cause: model.cause,
            description: model.description,
            spent_at: model.spent_at,
            recorded_at: model.recorded_at,
        })
    }
}
