// HTTP control surface server

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, sync::mpsc::Receiver, task::JoinHandle};
use tower_http::cors::{Any, CorsLayer};

use crate::{log::Logger, log_error, log_info, server::DashboardContext};

use super::{not_found, post_activity, post_media_event, post_state, status_page};

/// Builds the router of the control surface
pub fn make_router(logger: Arc<Logger>, context: DashboardContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(status_page))
        .route("/status", get(status_page))
        .route("/api/state", post(post_state))
        .route("/api/activity", post(post_activity))
        .route("/api/media", post(post_media_event))
        .fallback(not_found)
        .layer(cors)
        .layer(Extension(logger))
        .layer(Extension(context))
}

/// Spawns the task serving the control surface
///
/// # Arguments
///
/// * `logger` - The logger
/// * `context` - The dashboard context
/// * `listener` - Listener, already bound to the HTTP port
/// * `cancel_receiver` - Receiver to stop the server gracefully
pub fn spawn_task_http_server(
    logger: Arc<Logger>,
    context: DashboardContext,
    listener: TcpListener,
    mut cancel_receiver: Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Ok(addr) = listener.local_addr() {
            log_info!(logger, format!("Listening on http://{}", addr));
        }

        let app = make_router(logger.clone(), context);

        let res = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                _ = cancel_receiver.recv().await;
            })
            .await;

        if let Err(e) = res {
            log_error!(logger, format!("HTTP server error: {}", e));
        }
    })
}
