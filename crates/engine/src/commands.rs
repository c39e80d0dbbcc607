//! Command structs for ledger writes.
//!
//! These types group parameters for the external write operations (donors,
//! donations, expenditures, media), keeping call sites readable and avoiding
//! long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{MediaKind, MoneyCents};

/// Register a donor.
#[derive(Clone, Debug)]
pub struct NewDonor {
    pub name: String,
    pub email: Option<String>,
}

impl NewDonor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Record a donation made by an existing donor.
#[derive(Clone, Debug)]
pub struct NewDonation {
    pub donor_id: Uuid,
    pub amount: MoneyCents,
    pub donated_at: DateTime<Utc>,
}

impl NewDonation {
    #[must_use]
    pub fn new(donor_id: Uuid, amount: MoneyCents, donated_at: DateTime<Utc>) -> Self {
        Self {
            donor_id,
            amount,
            donated_at,
        }
    }
}

/// Record money spent on a cause.
#[derive(Clone, Debug)]
pub struct NewExpenditure {
    pub amount: MoneyCents,
    pub cause: String,
    pub description: Option<String>,
    pub spent_at: DateTime<Utc>,
}

impl NewExpenditure {
    #[must_use]
    pub fn new(amount: MoneyCents, cause: impl Into<String>, spent_at: DateTime<Utc>) -> Self {
        Self {
            amount,
            cause: cause.into(),
            description: None,
            spent_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Attach a media descriptor to an expenditure. Appended after existing media.
#[derive(Clone, Debug)]
pub struct NewMedia {
    pub expenditure_id: Uuid,
    pub kind: MediaKind,
    pub url: String,
}

impl NewMedia {
    #[must_use]
    pub fn new(expenditure_id: Uuid, kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            expenditure_id,
            kind,
            url: url.into(),
        }
    }
}
