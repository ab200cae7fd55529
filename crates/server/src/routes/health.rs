use axum::{Router, routing::get};

use crate::state::AppState;

pub async fn health_check() -> &'static str {
    "ok"
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::routes::test_support::{get, send, test_app};

    #[tokio::test]
    async fn test_health_check() {
        let (_db, app) = test_app().await;
        let (status, body) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".to_string()));
    }
}
