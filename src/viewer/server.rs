// Viewer WebSocket server

use std::sync::Arc;

use tokio::{net::TcpListener, task::JoinHandle};

use crate::{log::Logger, log_error, log_info, state::StateStore};

use super::handle_viewer_connection;

/// Spawns the task accepting viewer connections
///
/// # Arguments
///
/// * `logger` - The logger
/// * `store` - The state store
/// * `listener` - Listener, already bound to the viewer port
///
/// The task ends if the listener fails.
pub fn spawn_task_viewer_server(
    logger: Arc<Logger>,
    store: Arc<StateStore>,
    listener: TcpListener,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Ok(addr) = listener.local_addr() {
            log_info!(logger, format!("Listening on ws://{}", addr));
        }

        loop {
            match listener.accept().await {
                Ok((connection, addr)) => {
                    tokio::spawn(handle_viewer_connection(
                        logger.clone(),
                        store.clone(),
                        connection,
                        addr.ip(),
                    ));
                }
                Err(e) => {
                    log_error!(logger, format!("Could not accept connection: {}", e));
                    return;
                }
            }
        }
    })
}
