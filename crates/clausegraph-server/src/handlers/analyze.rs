use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use clausegraph_core::api_types::{AnalysisReport, AnalyzeRequest};
use clausegraph_core::RawDocument;

use crate::state::AppState;

#[instrument(skip(state, req), fields(source = %req.source_name))]
pub async fn analyze_contract(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, (StatusCode, Json<Value>)> {
    if req.text.trim().is_empty() {
        warn!("Rejected analysis request with empty text");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "text must not be empty" })),
        ));
    }

    info!(
        chars = req.text.len(),
        ai_review = req.ai_review,
        "Received analysis request"
    );

    let document = RawDocument::new(req.source_name, req.text);
    match state.pipeline_for(req.ai_review).run(&document).await {
        Ok(report) => {
            info!(
                run_id = %report.run_id,
                anomalies = report.summary.total,
                "Analysis completed successfully"
            );
            Ok(Json(report))
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            let status = if e.is_invalid_argument() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err((
                status,
                Json(json!({ "error": format!("Analysis failed: {e}") })),
            ))
        }
    }
}
