use anyhow::Result;
use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::api::models::ErrorResponse;
use crate::domain::AnalysisResult;
use crate::services::AnalysisService;
use crate::store::SessionStore;

pub mod analysis;
pub mod health;
pub mod session;

pub const SESSION_HEADER: &str = "x-session-id";

pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub analysis: AnalysisService,
    sessions_created: AtomicUsize,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, analysis: AnalysisService) -> Self {
        Self {
            store,
            analysis,
            sessions_created: AtomicUsize::new(0),
        }
    }

    /// Store an analysis under the request's session, minting an id when absent.
    ///
    /// A minted id only counts as a session once its data is stored.
    pub fn save_session(&self, headers: &HeaderMap, analysis: &AnalysisResult) -> Result<String> {
        let existing = session_id(headers);
        let id = existing.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

        self.store.put(&id, analysis)?;
        if existing.is_none() {
            self.sessions_created.fetch_add(1, Ordering::Relaxed);
        }
        Ok(id)
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::Relaxed)
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

pub fn store_error(err: anyhow::Error) -> Response {
    error!("Session store failure: {:#}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Session storage error")
}

/// Echo the session id back so clients can keep using it
pub fn with_session_header(mut response: Response, session_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
