// Viewer connection handling

use std::{net::IpAddr, sync::Arc};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::accept_async;
use tungstenite::Message;

use crate::{
    hub::ViewerSubscription,
    log::Logger,
    log_debug, log_error, log_info,
    state::StateStore,
};

/// Handles a viewer connection, until it is closed
///
/// The viewer is subscribed to the hub, a writer task drains its queue
/// into the socket while this task reads from it.
///
/// # Arguments
///
/// * `logger` - The logger
/// * `store` - The state store, to subscribe the viewer
/// * `connection` - The TCP connection
/// * `ip` - The client IP address
pub async fn handle_viewer_connection(
    logger: Arc<Logger>,
    store: Arc<StateStore>,
    connection: TcpStream,
    ip: IpAddr,
) {
    let stream = match accept_async(connection).await {
        Ok(s) => s,
        Err(e) => {
            log_debug!(logger, format!("Handshake failed with {}: {}", ip, e));
            return;
        }
    };

    let ViewerSubscription {
        handle,
        mut receiver,
    } = match store.subscribe_viewer().await {
        Ok(s) => s,
        Err(_) => {
            log_error!(logger, format!("Could not subscribe viewer from {}", ip));
            return;
        }
    };

    log_info!(
        logger,
        format!(
            "Viewer #{} connected from {}. Total: {}",
            handle.id,
            ip,
            store.hub().viewer_count().await
        )
    );

    let (mut write_stream, mut read_stream) = stream.split();

    // Writer: ends when the hub drops the channel or the socket fails

    let writer_logger = logger.clone();
    let viewer_id = handle.id;

    let writer = tokio::spawn(async move {
        while let Some(payload) = receiver.recv().await {
            if let Err(e) = write_stream.send(Message::Text(payload)).await {
                log_debug!(writer_logger, format!("Viewer #{}: send error: {}", viewer_id, e));
                return;
            }
        }

        _ = write_stream.close().await;
    });

    // Reader: viewers are not expected to send anything

    while let Some(r) = read_stream.next().await {
        match r {
            Ok(Message::Close(_)) => {
                break;
            }
            Ok(_) => {}
            Err(e) => {
                log_debug!(logger, format!("Viewer #{}: read error: {}", handle.id, e));
                break;
            }
        }
    }

    handle.mark_closing();
    store.hub().unsubscribe(&handle).await;

    // The channel is gone, so the writer ends once the queue is drained
    _ = writer.await;

    log_info!(
        logger,
        format!(
            "Viewer #{} disconnected. Total: {}",
            handle.id,
            store.hub().viewer_count().await
        )
    );
}
