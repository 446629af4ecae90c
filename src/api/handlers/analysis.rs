use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::{info, warn};
use std::sync::Arc;

use super::{AppState, error_response, store_error, with_session_header};
use crate::api::models::{AnalyzeLinkRequest, AnalyzeResponse, AnalyzeResultsRequest, UserSession};
use crate::domain::AnalysisResult;
use crate::errors::SupplyError;

pub async fn analyze_link(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeLinkRequest>,
) -> Response {
    let link = match request.usms_link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => link.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "USMS link is required"),
    };

    info!("Analysis requested for {}", link);

    let analysis = match state.analysis.analyze_link(&link).await {
        Ok(analysis) => analysis,
        Err(SupplyError::InvalidLink(link)) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Not a USMS SwimmerID or link: {}", link));
        }
        Err(e) => {
            warn!("Failed to fetch results for {}: {}", link, e);
            return error_response(StatusCode::BAD_GATEWAY, format!("Failed to fetch USMS results: {}", e));
        }
    };

    store_and_respond(&state, &headers, analysis)
}

pub async fn analyze_results(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeResultsRequest>,
) -> Response {
    let analysis = state.analysis.analyze_records(&request.swimmer, &request.results);

    store_and_respond(&state, &headers, analysis)
}

fn store_and_respond(state: &AppState, headers: &HeaderMap, analysis: AnalysisResult) -> Response {
    let session_id = match state.save_session(headers, &analysis) {
        Ok(id) => id,
        Err(e) => return store_error(e),
    };

    let response = AnalyzeResponse {
        user_session: UserSession {
            user_id: session_id.clone(),
            swimmer_name: analysis.swimmer.name.clone(),
        },
        analysis,
    };
    with_session_header(Json(response).into_response(), &session_id)
}
