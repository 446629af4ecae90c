use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{
    AppState,
    analysis::{analyze_link, analyze_results},
    health::health_check,
    session::{active_users, clear_session, get_data, get_session},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_link))
        .route("/api/analyze/results", post(analyze_results))
        .route("/api/session", get(get_session).delete(clear_session))
        .route("/api/data", get(get_data))
        .route("/api/health", get(health_check))
        .route("/api/users/active", get(active_users))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
