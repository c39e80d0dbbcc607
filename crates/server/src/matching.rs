use api_types::matching::{MatchListResponse, MatchingRun};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState, views};

/// Run a matching pass on demand, e.g. after a previous pass failed.
pub async fn run(State(state): State<ServerState>) -> Result<Json<MatchingRun>, ServerError> {
    let created = state.engine.run_matching().await?;
    Ok(Json(MatchingRun {
        created: created.into_iter().map(views::allocation).collect(),
    }))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<MatchListResponse>, ServerError> {
    let matches = state.engine.matches().await?;
    Ok(Json(MatchListResponse {
        matches: matches.into_iter().map(views::allocation).collect(),
    }))
}
