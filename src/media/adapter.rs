// Adapter from media server events to state changes

use std::sync::Arc;

use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::{
    log::Logger,
    log_info, log_success, log_warning,
    state::{ActivityType, NewActivity, ServerStateUpdate, StateStore},
};

use super::{MediaServerEvent, MediaSession};

/// Applies the lifecycle events of the media server to the state store
pub struct MediaEventAdapter {
    /// Logger
    logger: Arc<Logger>,

    /// State store
    store: Arc<StateStore>,
}

impl MediaEventAdapter {
    /// Creates new MediaEventAdapter
    pub fn new(logger: Arc<Logger>, store: Arc<StateStore>) -> MediaEventAdapter {
        MediaEventAdapter { logger, store }
    }

    /// Handles a media server event
    pub async fn handle_event(&self, event: MediaServerEvent) {
        let logger = &self.logger;
        let session = event.get_session();

        log_info!(
            logger,
            format!(
                "[{}] id={} StreamPath={} ip={}",
                event.get_name(),
                session.session_id,
                session.stream_path,
                session.get_display_ip()
            )
        );

        match &event {
            MediaServerEvent::Connect(_) | MediaServerEvent::PrePublish(_) => {}
            MediaServerEvent::PublishStart(session) => {
                self.camera_connected(session).await;
            }
            MediaServerEvent::PublishStop(session) => {
                self.camera_disconnected(session).await;
            }
            MediaServerEvent::PrePlay {
                publisher_active, ..
            } => {
                if !publisher_active {
                    log_warning!(
                        logger,
                        "No stream published yet, the player is expected to retry"
                    );
                }
            }
            MediaServerEvent::PlayStart(session) => {
                self.viewer_connected(session).await;
            }
            MediaServerEvent::PlayStop(session) => {
                self.viewer_disconnected(session).await;
            }
        }
    }

    /// Marks the media server as ready to accept connections
    pub async fn on_server_ready(&self) {
        let logger = &self.logger;
        let message = "RTMP server started";

        log_success!(logger, "Server ready, waiting for connections...");

        self.store.mark_ready(message).await;
        self.store
            .record_activity(NewActivity::new(ActivityType::Success, "check-circle", message))
            .await;
    }

    async fn camera_connected(&self, session: &MediaSession) {
        let logger = &self.logger;
        let ip = session.get_display_ip();
        let message = format!("Camera connected from {}", ip);

        log_success!(logger, format!("Camera connected and streaming from {}", ip));

        self.store
            .apply_state_update(ServerStateUpdate {
                camera_connected: Some(true),
                camera_ip: Some(Some(ip)),
                ..ServerStateUpdate::event(&message)
            })
            .await;

        self.store
            .record_activity(NewActivity::new(ActivityType::Success, "video", &message))
            .await;
    }

    async fn camera_disconnected(&self, session: &MediaSession) {
        let logger = &self.logger;
        let message = format!("Camera disconnected ({})", session.get_display_ip());

        log_warning!(logger, message);

        self.store
            .apply_state_update(ServerStateUpdate {
                camera_connected: Some(false),
                camera_ip: Some(None),
                ..ServerStateUpdate::event(&message)
            })
            .await;

        self.store
            .record_activity(NewActivity::new(ActivityType::Warning, "wifi-off", &message))
            .await;
    }

    async fn viewer_connected(&self, session: &MediaSession) {
        let logger = &self.logger;
        let ip = session.get_display_ip();
        let message = format!("Viewer connected from {}", ip);

        log_success!(logger, message);

        self.store
            .apply_state_update(ServerStateUpdate {
                obs_connected: Some(true),
                obs_ip: Some(Some(ip)),
                ..ServerStateUpdate::event(&message)
            })
            .await;

        self.store
            .record_activity(NewActivity::new(ActivityType::Success, "monitor", &message))
            .await;
    }

    async fn viewer_disconnected(&self, session: &MediaSession) {
        let logger = &self.logger;
        let message = format!("Viewer disconnected ({})", session.get_display_ip());

        log_warning!(logger, message);

        self.store
            .apply_state_update(ServerStateUpdate {
                obs_connected: Some(false),
                obs_ip: Some(None),
                ..ServerStateUpdate::event(&message)
            })
            .await;

        self.store
            .record_activity(NewActivity::new(ActivityType::Warning, "wifi-off", &message))
            .await;
    }
}

/// Spawns a task to apply the queued media server events, one at a time
///
/// # Arguments
///
/// * `adapter` - The adapter
/// * `receiver` - Receiving end of the media event channel
pub fn spawn_task_media_event_adapter(
    adapter: Arc<MediaEventAdapter>,
    mut receiver: UnboundedReceiver<MediaServerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            adapter.handle_event(event).await;
        }
    })
}
