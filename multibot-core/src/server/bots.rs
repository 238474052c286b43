use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::error::MultibotError;
use crate::models::{Bot, BotUpdate, NewBot};

use super::{ApiError, AppState};

pub async fn list_bots(State(state): State<AppState>) -> Result<Json<Vec<Bot>>, ApiError> {
    let bots = state
        .store
        .list_active()
        .await
        .map_err(|e| ApiError::from_error("Failed to fetch bots", e))?;
    Ok(Json(bots))
}

pub async fn create_bot(
    State(state): State<AppState>,
    Json(body): Json<NewBot>,
) -> Result<impl IntoResponse, ApiError> {
    let bot = body
        .into_bot()
        .map_err(|e| ApiError::from_error("Failed to create bot", e))?;

    let created = state
        .store
        .create(&bot)
        .await
        .map_err(|e| ApiError::from_error("Failed to create bot", e))?;

    info!(bot_id = %created.id, "Created bot '{}'", created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_bot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Bot>, ApiError> {
    let bot = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| ApiError::from_error("Failed to fetch bot", e))?
        .ok_or_else(|| MultibotError::BotNotFound(id.clone()))?;

    if !bot.is_active {
        return Err(MultibotError::BotInactive(id).into());
    }

    Ok(Json(bot))
}

pub async fn update_bot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<BotUpdate>,
) -> Result<Json<Bot>, ApiError> {
    let mut bot = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| ApiError::from_error("Failed to update bot", e))?
        .ok_or_else(|| MultibotError::BotNotFound(id.clone()))?;

    changes
        .apply(&mut bot)
        .map_err(|e| ApiError::from_error("Failed to update bot", e))?;

    let updated = state
        .store
        .update(&bot)
        .await
        .map_err(|e| ApiError::from_error("Failed to update bot", e))?
        .ok_or_else(|| MultibotError::BotNotFound(id.clone()))?;

    info!(bot_id = %updated.id, "Updated bot");
    Ok(Json(updated))
}

pub async fn delete_bot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state
        .store
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_error("Failed to delete bot", e))?;

    if !deleted {
        return Err(MultibotError::BotNotFound(id).into());
    }

    info!(bot_id = %id, "Deleted bot");
    Ok(Json(json!({ "message": "Bot deleted successfully" })))
}
