use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of the matching pass triggered by a write.
///
/// Serialized as `{"status": "completed", "created": 2}`,
/// `{"status": "scheduled"}` or `{"status": "failed", "message": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchingStatus {
    Completed { created: usize },
    Scheduled,
    Failed { message: String },
}

/// Response body for endpoints that create a donation or an expenditure.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub id: Uuid,
    pub matching: MatchingStatus,
}

pub mod donor {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonorNew {
        pub name: String,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonorView {
        pub id: Uuid,
        pub name: String,
        pub email: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    /// Request body for `PATCH /donors/{id}/contact`. A missing or empty
    /// email clears it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactUpdate {
        pub email: Option<String>,
    }
}

pub mod donation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationNew {
        pub donor_id: Uuid,
        /// Must be > 0.
        pub amount_minor: i64,
        /// RFC3339 timestamp.
        pub donated_at: DateTime<Utc>,
    }
}

pub mod expenditure {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenditureNew {
        /// Must be > 0.
        pub amount_minor: i64,
        pub cause: String,
        pub description: Option<String>,
        /// RFC3339 timestamp.
        pub spent_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenditureView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub cause: String,
        pub description: Option<String>,
        pub spent_at: DateTime<Utc>,
    }
}

pub mod media {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MediaKind {
        Image,
        Video,
        Document,
        Link,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MediaNew {
        pub kind: MediaKind,
        pub url: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MediaView {
        pub id: Uuid,
        pub kind: MediaKind,
        pub url: String,
        pub position: i32,
    }
}

pub mod matching {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchView {
        pub id: Uuid,
        pub donation_id: Uuid,
        pub expenditure_id: Uuid,
        pub allocated_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Response body for `POST /matching/run`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchingRun {
        pub created: Vec<MatchView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MatchListResponse {
        pub matches: Vec<MatchView>,
    }
}

pub mod dashboard {
    use super::*;
    use crate::{donor::DonorView, expenditure::ExpenditureView, media::MediaView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub expenditure: ExpenditureView,
        pub allocated_minor: i64,
        pub media: Vec<MediaView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardView {
        pub donor: DonorView,
        pub total_donated_minor: i64,
        pub total_allocated_minor: i64,
        pub contributions: Vec<ContributionView>,
    }
}
