// Main

mod http;
mod hub;
mod log;
mod media;
mod metrics;
mod server;
mod state;
mod tailer;
mod utils;
mod viewer;

use std::{sync::Arc, time::Duration};

use http::spawn_task_http_server;
use hub::BroadcastHub;
use log::{LogConfig, Logger};
use media::{media_event_channel, spawn_task_media_event_adapter, MediaEventAdapter};
use metrics::{spawn_task_metrics_sampler, SyntheticMetricsProvider};
use server::{
    spawn_task_supervisor, wait_for_shutdown_signal, DashboardConfiguration, DashboardContext,
    ShutdownFlag,
};
use state::{ActivityType, NewActivity, StateStore};
use tailer::spawn_task_log_tailer;
use tokio::net::TcpListener;
use viewer::spawn_task_viewer_server;

/// Max time to wait for the HTTP server to stop
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Main function
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load .env
    let _ = dotenvy::dotenv();

    // Initialize logger

    let log_config = LogConfig::load_from_env();

    if let Some(dir) = log_config.file.as_ref().and_then(|f| f.parent()) {
        if !dir.as_os_str().is_empty() {
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                eprintln!("Could not create log directory {}: {}", dir.display(), e);
            }
        }
    }

    let logger = Logger::new(log_config);

    // Print version

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    logger.log_info(&format!("RTMP Dashboard ({VERSION})"));

    // Load configuration

    let config = match DashboardConfiguration::load_from_env(&logger) {
        Ok(c) => Arc::new(c),
        Err(_) => {
            std::process::exit(1);
        }
    };

    // Bind listeners

    let http_listener = match TcpListener::bind(config.get_http_listen_addr()).await {
        Ok(l) => l,
        Err(e) => {
            logger.log_error(&format!("Could not create HTTP listener: {}", e));
            std::process::exit(1);
        }
    };

    let ws_listener = match TcpListener::bind(config.get_ws_listen_addr()).await {
        Ok(l) => l,
        Err(e) => {
            logger.log_error(&format!("Could not create WebSocket listener: {}", e));
            std::process::exit(1);
        }
    };

    // Core components

    let hub = Arc::new(BroadcastHub::new(Arc::new(
        logger.make_child_logger("[HUB] "),
    )));

    let store = Arc::new(StateStore::new(
        Arc::new(logger.make_child_logger("[STATE] ")),
        hub.clone(),
        config.log_file.clone(),
        config.initial_log_lines,
    ));

    let (media_events, media_receiver) = media_event_channel();

    let adapter = Arc::new(MediaEventAdapter::new(
        Arc::new(logger.make_child_logger("[MEDIA] ")),
        store.clone(),
    ));

    let context = DashboardContext {
        config: config.clone(),
        store: store.clone(),
        media_events,
    };

    // Spawn tasks

    let shutdown = ShutdownFlag::new();

    let (cancel_tailer_sender, cancel_tailer_receiver) = tokio::sync::mpsc::channel::<()>(1);
    let (cancel_metrics_sender, cancel_metrics_receiver) = tokio::sync::mpsc::channel::<()>(1);
    let (cancel_http_sender, cancel_http_receiver) = tokio::sync::mpsc::channel::<()>(1);

    match &config.log_file {
        Some(path) => {
            spawn_task_supervisor(
                store.clone(),
                "log-tailer",
                spawn_task_log_tailer(
                    Arc::new(logger.make_console_child_logger("[TAILER] ")),
                    path.clone(),
                    config.get_log_tail_interval(),
                    hub.clone(),
                    cancel_tailer_receiver,
                ),
                shutdown.clone(),
            );
        }
        None => {
            drop(cancel_tailer_receiver);
        }
    }

    spawn_task_supervisor(
        store.clone(),
        "metrics-sampler",
        spawn_task_metrics_sampler(
            store.clone(),
            Box::new(SyntheticMetricsProvider::new()),
            config.get_metrics_interval(),
            cancel_metrics_receiver,
        ),
        shutdown.clone(),
    );

    spawn_task_supervisor(
        store.clone(),
        "media-event-adapter",
        spawn_task_media_event_adapter(adapter.clone(), media_receiver),
        shutdown.clone(),
    );

    spawn_task_supervisor(
        store.clone(),
        "viewer-server",
        spawn_task_viewer_server(
            Arc::new(logger.make_child_logger("[SERVER:WS] ")),
            store.clone(),
            ws_listener,
        ),
        shutdown.clone(),
    );

    let http_server = spawn_task_http_server(
        Arc::new(logger.make_child_logger("[SERVER:HTTP] ")),
        context,
        http_listener,
        cancel_http_receiver,
    );

    let http_supervisor =
        spawn_task_supervisor(store.clone(), "http-server", http_server, shutdown.clone());

    // Server ready

    let ready_delay = config.get_ready_delay();
    let ready_adapter = adapter.clone();

    tokio::spawn(async move {
        tokio::time::sleep(ready_delay).await;
        ready_adapter.on_server_ready().await;
    });

    // Wait for the shutdown signal

    let signal_name = wait_for_shutdown_signal().await;

    logger.log_warning(&format!("Shutdown signal received ({})", signal_name));

    shutdown.set();

    store
        .record_activity(NewActivity::new(
            ActivityType::Error,
            "x-circle",
            &format!("Server stopped ({})", signal_name),
        ))
        .await;

    _ = cancel_tailer_sender.send(()).await;
    _ = cancel_metrics_sender.send(()).await;

    hub.close_all().await;

    _ = cancel_http_sender.send(()).await;

    // Let the HTTP server and the viewer writers finish before the runtime drops
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, http_supervisor)
        .await
        .is_err()
    {
        logger.log_warning("HTTP server did not stop in time");
    }

    logger.log_success("Server closed");

    // End of main

    Ok(())
}
