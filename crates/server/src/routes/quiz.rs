//! Routes for the questionnaire: catalogue and response submission.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::quiz_response::{QuizAnswers, ResponseStatus};
use serde::{Deserialize, Serialize};
use services::services::{
    character_processor::CharacterProcessor,
    question_catalogue::{self, QuizQuestion},
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Either raw answers or catalogue selections, never both.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub user_id: String,
    #[serde(default)]
    pub answers: Option<QuizAnswers>,
    #[serde(default)]
    pub selections: Option<BTreeMap<u32, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedQuizResponse {
    pub response_id: Uuid,
    pub status: ResponseStatus,
}

/// GET /api/quiz/questions
pub async fn list_questions() -> ResponseJson<ApiResponse<Vec<QuizQuestion>>> {
    ResponseJson(ApiResponse::success(question_catalogue::catalogue().to_vec()))
}

/// POST /api/quiz/responses
pub async fn submit_response(
    State(state): State<AppState>,
    payload: Result<Json<SubmitQuizResponse>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<SubmittedQuizResponse>>, ApiError> {
    let Json(payload) = payload?;
    let processor = CharacterProcessor::new(state.db().pool.clone());

    let response = match (payload.answers, payload.selections) {
        (Some(answers), None) => processor.submit(&payload.user_id, answers).await?,
        (None, Some(selections)) => {
            processor
                .submit_selections(&payload.user_id, &selections)
                .await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "provide exactly one of answers or selections".to_string(),
            ));
        }
    };

    Ok(ResponseJson(ApiResponse::success(SubmittedQuizResponse {
        response_id: response.id,
        status: response.status,
    })))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/quiz",
        Router::new()
            .route("/questions", get(list_questions))
            .route("/responses", post(submit_response)),
    )
}
