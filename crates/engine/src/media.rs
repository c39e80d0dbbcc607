//! Media descriptors attached to expenditures (receipts, photos, links).
//!
//! Media rows are written by request handlers; the core only reads them when
//! building a donor dashboard.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Document,
    Link,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Document => "document",
            Self::Link => "link",
        }
    }
}

impl TryFrom<&str> for MediaKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            "link" => Ok(Self::Link),
            other => Err(EngineError::Validation(format!(
                "invalid media kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: Uuid,
    pub expenditure_id: Uuid,
    pub kind: MediaKind,
    pub url: String,
    pub position: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenditure_media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expenditure_id: String,
    pub kind: String,
    pub url: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenditures::Entity",
        from = "Column::ExpenditureId",
        to = "super::expenditures::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenditures,
}

impl Related<super::expenditures::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenditures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Media> for ActiveModel {
    fn from(media: &Media) -> Self {
        Self {
            id: ActiveValue::Set(media.id.to_string()),
            expenditure_id: ActiveValue::Set(media.expenditure_id.to_string()),
            kind: ActiveValue::Set(media.kind.as_str().to_string()),
            url: ActiveValue::Set(media.url.clone()),
            position: ActiveValue::Set(media.position),
        }
    }
}

impl TryFrom<Model> for Media {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "media")?,
            expenditure_id: parse_uuid(&model.expenditure_id, "expenditure")?,
            kind: MediaKind::try_from(model.kind.as_str())?,
            url: model.url,
            position: model.position,
        })
    }
}
