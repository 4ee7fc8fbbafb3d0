use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use clausegraph_core::api_types::HealthResponse;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let response = HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        ai_review_enabled: state.pipeline.has_analyzer(),
    };

    (StatusCode::OK, Json(response))
}
