//! Routes for character classification and result lookup.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::character_result::{CharacterResultView, ProcessedResult};
use serde::{Deserialize, Serialize};
use services::services::character_processor::{CharacterProcessor, ProcessError};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCharacterRequest {
    pub response_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ProcessCharacterResponse {
    pub success: bool,
    pub results: ProcessedResult,
}

/// Response ids are uuids; anything else cannot name a stored response.
fn parse_response_id(raw: &str) -> Result<Uuid, ProcessError> {
    Uuid::parse_str(raw).map_err(|_| ProcessError::NotFound)
}

/// POST /api/process-character
pub async fn process_character(
    State(state): State<AppState>,
    payload: Result<Json<ProcessCharacterRequest>, JsonRejection>,
) -> Result<ResponseJson<ProcessCharacterResponse>, ApiError> {
    let Json(payload) = payload?;
    let response_id = parse_response_id(&payload.response_id)?;

    let results = CharacterProcessor::new(state.db().pool.clone())
        .process(response_id, &payload.user_id)
        .await?;

    Ok(ResponseJson(ProcessCharacterResponse {
        success: true,
        results,
    }))
}

/// GET /api/results/{response_id}
pub async fn get_result(
    State(state): State<AppState>,
    Path(response_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<CharacterResultView>>, ApiError> {
    let response_id = parse_response_id(&response_id)?;
    let result = CharacterProcessor::new(state.db().pool.clone())
        .result(response_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

/// GET /api/users/{user_id}/result
pub async fn get_latest_user_result(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Option<CharacterResultView>>>, ApiError> {
    let result = CharacterProcessor::new(state.db().pool.clone())
        .latest_result_for_user(&user_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/process-character", post(process_character))
        .route("/results/{response_id}", get(get_result))
        .route("/users/{user_id}/result", get(get_latest_user_result))
}
