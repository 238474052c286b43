use axum::extract::State;
use axum::Json;
use tracing::debug;
use uuid::Uuid;

use crate::completion::{build_messages, generate_suggestions, DEFAULT_CONFIDENCE, FALLBACK_REPLY};
use crate::error::MultibotError;
use crate::models::{ChatRequest, ChatResponse};

use super::{ApiError, AppState};

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if request.message.is_empty() {
        return Err(MultibotError::EmptyMessage.into());
    }

    let session_id = request
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    let context = request.context.as_ref();
    let messages = build_messages(&request.message, context);

    debug!(session_id = %session_id, provider = state.completion.provider_name(), "Forwarding chat turn");

    let reply = state
        .completion
        .complete(&messages)
        .await
        .map_err(|e| ApiError::from_error("Internal server error", e))?
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());

    Ok(Json(ChatResponse {
        message: reply,
        session_id,
        suggestions: Some(generate_suggestions(context)),
        confidence: Some(DEFAULT_CONFIDENCE),
    }))
}
