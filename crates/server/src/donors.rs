//! Donor API endpoints.

use api_types::{
    dashboard::DashboardView,
    donor::{ContactUpdate, DonorNew, DonorView},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::NewDonor;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn donor_new(
    State(state): State<ServerState>,
    Json(payload): Json<DonorNew>,
) -> Result<(StatusCode, Json<DonorView>), ServerError> {
    let mut cmd = NewDonor::new(payload.name);
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    let donor = state.engine.new_donor(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::donor(donor))))
}

pub async fn update_contact(
    State(state): State<ServerState>,
    Path(donor_id): Path<Uuid>,
    Json(payload): Json<ContactUpdate>,
) -> Result<Json<DonorView>, ServerError> {
    let donor = state
        .engine
        .update_donor_contact(donor_id, payload.email.as_deref())
        .await?;
    Ok(Json(views::donor(donor)))
}

pub async fn dashboard(
    State(state): State<ServerState>,
    Path(donor_id): Path<Uuid>,
) -> Result<Json<DashboardView>, ServerError> {
    let dashboard = state.engine.dashboard(donor_id).await?;
    Ok(Json(views::dashboard(dashboard)))
}
