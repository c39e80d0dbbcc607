use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod donors;
mod ledger;
mod matching;
mod server;
mod views;

pub mod types {
    pub use api_types::{MatchingStatus, RecordedResponse};

    pub mod donor {
        pub use api_types::donor::{ContactUpdate, DonorNew, DonorView};
    }

    pub mod donation {
        pub use api_types::donation::DonationNew;
    }

    pub mod expenditure {
        pub use api_types::expenditure::{ExpenditureNew, ExpenditureView};
    }

    pub mod media {
        pub use api_types::media::{MediaKind, MediaNew, MediaView};
    }

    pub mod matching {
        pub use api_types::matching::{MatchListResponse, MatchView, MatchingRun};
    }

    pub mod dashboard {
        pub use api_types::dashboard::{ContributionView, DashboardView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
        EngineError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvariantViolation(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::InvariantViolation(msg) => {
            tracing::error!("ledger invariant violation: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
