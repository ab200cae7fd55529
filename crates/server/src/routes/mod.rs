use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod character;
pub mod health;
pub mod quiz;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router(&state))
        .merge(quiz::router(&state))
        .merge(character::router(&state));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
