//! Development backend that speaks the same wire contract as the real one,
//! answering from deterministic templates so the wizard can run offline.

pub mod handlers;
pub mod scoring;
pub mod templates;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::services::{EXTRACT_JOB_ENDPOINT, GENERATE_EMAIL_ENDPOINT};

/// Shared state injected into the stub handlers.
#[derive(Debug, Clone, Default)]
pub struct StubState {
    /// Artificial delay added before each extract/generate response.
    pub latency: Duration,
}

impl StubState {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub(crate) async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

pub fn build_router(state: StubState) -> Router {
    Router::new()
        .route("/health", get(handlers::handle_health))
        .route("/api/supported-sites", get(handlers::handle_supported_sites))
        .route(EXTRACT_JOB_ENDPOINT, post(handlers::handle_extract_job))
        .route(GENERATE_EMAIL_ENDPOINT, post(handlers::handle_generate_email))
        .fallback(handlers::handle_not_found)
        .with_state(state)
}

/// Serves the stub on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: StubState) -> anyhow::Result<()> {
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Stub backend listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
