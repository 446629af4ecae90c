use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisResult, RaceResult, SwimmerIdentity};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeLinkRequest {
    #[serde(default)]
    pub usms_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResultsRequest {
    pub swimmer: SwimmerIdentity,
    #[serde(default)]
    pub results: Vec<RaceResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: String,
    pub swimmer_name: String,
}

/// Analysis payload with the owning session attached
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub user_session: UserSession,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: String,
    pub has_data: bool,
    pub swimmer_name: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUsers {
    pub active_users: usize,
    pub total_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
