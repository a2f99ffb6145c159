//! HTTP gateway (Axum).
//!
//! - `POST /ask` runs the question through the [`Orchestrator`](crate::pipeline::Orchestrator)
//! - `GET /healthz` liveness
//! - `GET /ready` component status

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::ask_handler;
pub use state::HandlerState;

use crate::completion::CompletionClient;

pub const STATUS_READY: &str = "ready";
pub const STATUS_ERROR: &str = "error";

pub fn create_router_with_state<C>(state: HandlerState<C>) -> Router
where
    C: CompletionClient + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<C>))
        .route("/ask", post(ask_handler::<C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub storage: &'static str,
    pub vectordb: &'static str,
    pub build_id: Option<String>,
    pub vectors: usize,
    pub embedder_mode: &'static str,
    pub scorer_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<C>(State(state): State<HandlerState<C>>) -> Response
where
    C: CompletionClient + 'static,
{
    let retriever = state.orchestrator.retriever().clone();
    let mode = |stub: bool| if stub { "stub" } else { "real" };
    let embedder_mode = mode(retriever.is_embedder_stub());

    let store = tokio::task::spawn_blocking(move || retriever.current_store().ok())
        .await
        .ok()
        .flatten();

    let storage = if state.vectorstore_path.is_dir() {
        STATUS_READY
    } else {
        STATUS_ERROR
    };

    let components = ComponentStatus {
        http: STATUS_READY,
        storage,
        vectordb: if store.is_some() {
            STATUS_READY
        } else {
            STATUS_ERROR
        },
        build_id: store.as_ref().map(|s| s.build_id().to_string()),
        vectors: store.as_ref().map_or(0, |s| s.len()),
        embedder_mode,
        scorer_mode: mode(state.orchestrator.reranker().is_stub()),
    };

    let is_ready = components.storage == STATUS_READY && components.vectordb == STATUS_READY;
    let (status_code, status) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    (status_code, Json(ReadyResponse { status, components })).into_response()
}
