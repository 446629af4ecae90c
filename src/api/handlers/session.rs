use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::{AppState, error_response, session_id, store_error};
use crate::api::models::{ActiveUsers, MessageResponse, SessionInfo};

pub async fn get_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_id(&headers) else {
        return error_response(StatusCode::NOT_FOUND, "No active session");
    };

    match state.store.get(&session_id) {
        Ok(Some(analysis)) => Json(SessionInfo {
            user_id: session_id,
            has_data: true,
            swimmer_name: analysis.swimmer.name,
        })
        .into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No data found for current session"),
        Err(e) => store_error(e),
    }
}

pub async fn clear_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_id(&headers) {
        if let Err(e) = state.store.delete(&session_id) {
            return store_error(e);
        }
    }

    Json(MessageResponse {
        message: "Session cleared successfully".to_string(),
    })
    .into_response()
}

pub async fn get_data(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_id(&headers) else {
        return error_response(StatusCode::NOT_FOUND, "No active session");
    };

    match state.store.get(&session_id) {
        Ok(Some(analysis)) => Json(analysis).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No data found for current session"),
        Err(e) => store_error(e),
    }
}

pub async fn active_users(State(state): State<Arc<AppState>>) -> Response {
    match state.store.len() {
        Ok(active_users) => Json(ActiveUsers {
            active_users,
            total_sessions: state.sessions_created().max(active_users),
        })
        .into_response(),
        Err(e) => store_error(e),
    }
}
