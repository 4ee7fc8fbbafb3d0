use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Analysis
        .route("/api/analyze", post(handlers::analyze::analyze_contract))
}
