// HTTP control surface routes

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    log::Logger,
    log_debug, log_info,
    media::{MediaEventListener, MediaEventPayload, MediaServerEvent},
    server::DashboardContext,
    state::{NewActivity, ServerStateUpdate},
    tailer::get_recent_logs,
};

use super::render_status_page;

/// Response of the API when the request was applied
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response of the API when the request body was invalid
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn success_response() -> Response {
    (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
}

fn error_response(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
}

/// Parses a JSON request body, keeping the parser message on failure
fn parse_body<T: DeserializeOwned>(logger: &Logger, body: &str) -> Result<T, Response> {
    serde_json::from_str::<T>(body).map_err(|e| {
        log_debug!(logger, format!("Invalid request body: {}", e));
        error_response(e.to_string())
    })
}

/// GET / and GET /status
pub async fn status_page(Extension(context): Extension<DashboardContext>) -> Html<String> {
    let logs = match &context.config.log_file {
        Some(path) => get_recent_logs(path, context.config.initial_log_lines).await,
        None => Vec::new(),
    };

    let state = context.store.snapshot().await;

    Html(render_status_page(
        &state,
        &logs,
        context.config.ws_port,
        Utc::now(),
    ))
}

/// POST /api/state
pub async fn post_state(
    Extension(logger): Extension<Arc<Logger>>,
    Extension(context): Extension<DashboardContext>,
    body: String,
) -> Response {
    let update: ServerStateUpdate = match parse_body(&logger, &body) {
        Ok(u) => u,
        Err(r) => return r,
    };

    let status = context.store.apply_state_update(update).await;

    log_info!(logger, format!("State updated: {:?}", status));

    success_response()
}

/// POST /api/activity
pub async fn post_activity(
    Extension(logger): Extension<Arc<Logger>>,
    Extension(context): Extension<DashboardContext>,
    body: String,
) -> Response {
    let activity: NewActivity = match parse_body(&logger, &body) {
        Ok(a) => a,
        Err(r) => return r,
    };

    let activity = context.store.record_activity(activity).await;

    log_info!(logger, format!("New activity: {}", activity.message));

    success_response()
}

/// POST /api/media
pub async fn post_media_event(
    Extension(logger): Extension<Arc<Logger>>,
    Extension(context): Extension<DashboardContext>,
    body: String,
) -> Response {
    let payload: MediaEventPayload = match parse_body(&logger, &body) {
        Ok(p) => p,
        Err(r) => return r,
    };

    context
        .media_events
        .on_media_event(MediaServerEvent::from(payload));

    success_response()
}

/// Any other route
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
