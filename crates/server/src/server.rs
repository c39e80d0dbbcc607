use axum::{
    Router,
    routing::{get, patch, post},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{donors, ledger, matching};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/donors", post(donors::donor_new))
        .route("/donors/{id}/contact", patch(donors::update_contact))
        .route("/donors/{id}/dashboard", get(donors::dashboard))
        .route("/donations", post(ledger::donation_new))
        .route("/expenditures", post(ledger::expenditure_new))
        .route(
            "/expenditures/{id}/media",
            post(ledger::media_new).get(ledger::media_list),
        )
        .route("/matching/run", post(matching::run))
        .route("/matches", get(matching::list))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
