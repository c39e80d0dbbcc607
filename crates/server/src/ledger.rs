//! Donation, expenditure and media endpoints.
//!
//! Creating a donation or an expenditure triggers a matching pass; the
//! response reports its outcome next to the new id.

use api_types::{
    RecordedResponse,
    donation::DonationNew,
    expenditure::ExpenditureNew,
    media::{MediaNew, MediaView},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{MoneyCents, NewDonation, NewExpenditure, NewMedia};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn donation_new(
    State(state): State<ServerState>,
    Json(payload): Json<DonationNew>,
) -> Result<(StatusCode, Json<RecordedResponse>), ServerError> {
    let recorded = state
        .engine
        .record_donation(NewDonation::new(
            payload.donor_id,
            MoneyCents::new(payload.amount_minor),
            payload.donated_at,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordedResponse {
            id: recorded.record.id,
            matching: views::matching_status(recorded.matching),
        }),
    ))
}

pub async fn expenditure_new(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenditureNew>,
) -> Result<(StatusCode, Json<RecordedResponse>), ServerError> {
    let mut cmd = NewExpenditure::new(
        MoneyCents::new(payload.amount_minor),
        payload.cause,
        payload.spent_at,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let recorded = state.engine.record_expenditure(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordedResponse {
            id: recorded.record.id,
            matching: views::matching_status(recorded.matching),
        }),
    ))
}

pub async fn media_new(
    State(state): State<ServerState>,
    Path(expenditure_id): Path<Uuid>,
    Json(payload): Json<MediaNew>,
) -> Result<(StatusCode, Json<MediaView>), ServerError> {
    let media = state
        .engine
        .attach_media(NewMedia::new(
            expenditure_id,
            views::media_kind(payload.kind),
            payload.url,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(views::media(media))))
}

pub async fn media_list(
    State(state): State<ServerState>,
    Path(expenditure_id): Path<Uuid>,
) -> Result<Json<Vec<MediaView>>, ServerError> {
    let media = state.engine.media(expenditure_id).await?;
    Ok(Json(media.into_iter().map(views::media).collect()))
}
