use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{DialogueState, RejectReason};
use crate::services::dialogue;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TurnRequest {
    #[serde(default)]
    pub filled: DialogueState,
    #[serde(default)]
    pub user_text: String,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub filled: DialogueState,
    pub next_question: String,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

/// POST /nlu: advance one dialogue turn, current slot state plus the
/// latest utterance in, updated state plus the next prompt out.
pub async fn advance_turn(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let user_text = payload.user_text.trim();
    tracing::info!(chars = user_text.len(), "processing dialogue turn");

    let outcome = dialogue::advance_turn(&state, payload.filled, user_text)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    Ok(Json(TurnResponse {
        filled: outcome.filled,
        next_question: outcome.next_question,
        ready: outcome.ready,
        reason: outcome.reason,
    }))
}
