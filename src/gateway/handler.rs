use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::cache::RAGCITE_CACHE_HEADER;
use crate::completion::CompletionClient;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::pipeline::{AskOutcome, AskRequest};

/// `POST /ask`: 200 with the answer, or 500 with the generic error payload.
#[instrument(skip(state, payload))]
pub async fn ask_handler<C>(
    State(state): State<HandlerState<C>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    C: CompletionClient + 'static,
{
    let Json(request) = payload?;
    debug!(question_chars = request.question.len(), "Question received");

    match state.orchestrator.ask(&request.question).await {
        AskOutcome::Answered(response) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                RAGCITE_CACHE_HEADER,
                HeaderValue::from_static(response.cache.as_str()),
            );
            Ok((StatusCode::OK, headers, Json(response)).into_response())
        }
        AskOutcome::Failed(error) => Err(GatewayError::Failed(error)),
    }
}
