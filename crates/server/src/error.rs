use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::services::{character_processor::ProcessError, character_scorer::ScoringError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Process(ProcessError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Process(
                ProcessError::Scoring(ScoringError::InvalidAnswer { .. })
                | ProcessError::Catalogue(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::Process(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Json(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Json(rejection) => rejection.body_text(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!(error = %message, "Request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ProcessError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ProcessError::Scoring(ScoringError::InvalidAnswer {
                key: "0".to_string(),
                reason: "bad".to_string(),
            }))
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ProcessError::Scoring(ScoringError::UnknownCharacterCode {
                code: "EAC".to_string(),
            }))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ProcessError::Database(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::BadRequest("nope".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
