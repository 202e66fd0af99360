// Shutdown signals

/// Waits for a shutdown signal
///
/// # Return value
///
/// Returns the name of the received signal (SIGINT or SIGTERM)
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => {
            _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

/// Waits for a shutdown signal
///
/// # Return value
///
/// Returns the name of the received signal
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> &'static str {
    _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
