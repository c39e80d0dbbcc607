//! Conversions from engine records to wire types.

use api_types::{
    MatchingStatus,
    dashboard::{ContributionView, DashboardView},
    donor::DonorView,
    expenditure::ExpenditureView,
    matching::MatchView,
    media::{MediaKind, MediaView},
};
use engine::{Dashboard, Donor, Expenditure, Match, Media, PassOutcome};

pub fn donor(donor: Donor) -> DonorView {
    DonorView {
        id: donor.id,
        name: donor.name,
        email: donor.email,
        created_at: donor.created_at,
    }
}

pub fn expenditure(expenditure: Expenditure) -> ExpenditureView {
    ExpenditureView {
        id: expenditure.id,
        amount_minor: expenditure.amount.cents(),
        cause: expenditure.cause,
        description: expenditure.description,
        spent_at: expenditure.spent_at,
    }
}

pub fn media_kind(kind: MediaKind) -> engine::MediaKind {
    match kind {
        MediaKind::Image => engine::MediaKind::Image,
        MediaKind::Video => engine::MediaKind::Video,
        MediaKind::Document => engine::MediaKind::Document,
        MediaKind::Link => engine::MediaKind::Link,
    }
}

pub fn media(media: Media) -> MediaView {
    let kind = match media.kind {
        engine::MediaKind::Image => MediaKind::Image,
        engine::MediaKind::Video => MediaKind::Video,
        engine::MediaKind::Document => MediaKind::Document,
        engine::MediaKind::Link => MediaKind::Link,
    };
    MediaView {
        id: media.id,
        kind,
        url: media.url,
        position: media.position,
    }
}

pub fn allocation(m: Match) -> MatchView {
    MatchView {
        id: m.id,
        donation_id: m.donation_id,
        expenditure_id: m.expenditure_id,
        allocated_minor: m.allocated.cents(),
        created_at: m.created_at,
    }
}

pub fn matching_status(outcome: PassOutcome) -> MatchingStatus {
    match outcome {
        PassOutcome::Completed(created) => MatchingStatus::Completed {
            created: created.len(),
        },
        PassOutcome::Scheduled => MatchingStatus::Scheduled,
        PassOutcome::Failed(err) => {
            tracing::warn!("matching pass after write failed: {err}");
            MatchingStatus::Failed {
                message: err.to_string(),
            }
        }
    }
}

pub fn dashboard(dashboard: Dashboard) -> DashboardView {
    DashboardView {
        donor: donor(dashboard.donor),
        total_donated_minor: dashboard.total_donated.cents(),
        total_allocated_minor: dashboard.total_allocated.cents(),
        contributions: dashboard
            .contributions
            .into_iter()
            .map(|c| ContributionView {
                expenditure: expenditure(c.expenditure),
                allocated_minor: c.allocated.cents(),
                media: c.media.into_iter().map(media).collect(),
            })
            .collect(),
    }
}
