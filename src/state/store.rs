// State store

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    hub::{BroadcastHub, DashboardMessage, ViewerSubscription},
    log::Logger,
    log_debug,
    tailer::get_recent_logs,
};

use super::{
    Activity, ActivityType, ErrorEntry, NewActivity, ServerMetrics, ServerState,
    ServerStateUpdate, ServerStatus,
};

/// Icon used when an activity does not specify one
pub const DEFAULT_ACTIVITY_ICON: &str = "info";

/// Mutable part of the store
struct StateStoreInner {
    /// The state
    state: ServerState,

    /// True if the status was forced and must not be derived
    /// until the connection flags change
    status_pinned: bool,

    /// ID of the last generated activity ID
    last_activity_id: i64,
}

/// Owner of the server state
///
/// Every mutation runs under the same lock and queues its broadcast
/// before releasing it, so viewers receive the changes in order.
pub struct StateStore {
    /// Logger
    logger: Arc<Logger>,

    /// Hub to broadcast the changes
    hub: Arc<BroadcastHub>,

    /// Log file to read the initial lines for new viewers
    log_file: Option<PathBuf>,

    /// Number of log lines sent to new viewers
    initial_log_lines: usize,

    /// State
    inner: Mutex<StateStoreInner>,
}

impl StateStore {
    /// Creates new StateStore, with the state of a process that just started
    ///
    /// # Arguments
    ///
    /// * `logger` - The logger
    /// * `hub` - The broadcast hub
    /// * `log_file` - The log file, for the initial lines sent to viewers
    /// * `initial_log_lines` - Max number of lines sent to new viewers
    pub fn new(
        logger: Arc<Logger>,
        hub: Arc<BroadcastHub>,
        log_file: Option<PathBuf>,
        initial_log_lines: usize,
    ) -> StateStore {
        StateStore {
            logger,
            hub,
            log_file,
            initial_log_lines,
            inner: Mutex::new(StateStoreInner {
                state: ServerState::new(Utc::now()),
                status_pinned: true,
                last_activity_id: 0,
            }),
        }
    }

    /// Gets the broadcast hub
    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    /// Gets a copy of the current state
    pub async fn snapshot(&self) -> ServerState {
        self.inner.lock().await.state.clone()
    }

    /// Merges a partial update into the state
    ///
    /// A provided status is applied as is and pinned. Otherwise the status
    /// is derived from the connection flags, unless it is pinned and
    /// the update does not touch the connection flags.
    ///
    /// Broadcasts state_update with the full state.
    ///
    /// # Return value
    ///
    /// Returns the status after the update
    pub async fn apply_state_update(&self, update: ServerStateUpdate) -> ServerStatus {
        let mut inner = self.inner.lock().await;

        let changes_connections = update.changes_connections();
        let state = &mut inner.state;

        if let Some(v) = update.camera_connected {
            state.camera_connected = v;
        }

        if let Some(v) = update.camera_ip {
            state.camera_ip = v;
        }

        if let Some(v) = update.obs_connected {
            state.obs_connected = v;
        }

        if let Some(v) = update.obs_ip {
            state.obs_ip = v;
        }

        if let Some(v) = update.last_event {
            state.last_event = v;
        }

        if let Some(v) = update.last_event_time {
            state.last_event_time = v;
        }

        if let Some(v) = update.start_time {
            state.start_time = v;
        }

        match update.status {
            Some(forced) => {
                inner.state.status = forced;
                inner.status_pinned = true;
            }
            None => {
                if changes_connections {
                    inner.status_pinned = false;
                }

                if !inner.status_pinned {
                    let derived = inner.state.derived_status();
                    inner.state.status = derived;
                }
            }
        }

        let logger = &self.logger;
        log_debug!(logger, format!("State updated. Status: {:?}", inner.state.status));

        self.hub
            .broadcast(&DashboardMessage::StateUpdate(&inner.state))
            .await;

        inner.state.status
    }

    /// Releases the initial status and derives it from the connection flags
    ///
    /// Broadcasts state_update with the full state.
    pub async fn mark_ready(&self, message: &str) {
        let mut inner = self.inner.lock().await;

        inner.status_pinned = false;
        let derived = inner.state.derived_status();
        inner.state.status = derived;
        inner.state.last_event = Some(message.to_string());
        inner.state.last_event_time = Some(Utc::now());

        self.hub
            .broadcast(&DashboardMessage::StateUpdate(&inner.state))
            .await;
    }

    /// Records an activity
    ///
    /// Missing ID and timestamp are generated. Generated IDs are strictly increasing.
    /// IDs supplied by the caller are kept as given and do not move the generator.
    /// Broadcasts new_activity.
    ///
    /// # Return value
    ///
    /// Returns the recorded activity
    pub async fn record_activity(&self, activity: NewActivity) -> Activity {
        let now = Utc::now();
        let mut inner = self.inner.lock().await;

        let id = match activity.id {
            Some(id) => id,
            None => {
                let id = now
                    .timestamp_millis()
                    .max(inner.last_activity_id.saturating_add(1));
                inner.last_activity_id = id;
                id
            }
        };

        let activity = Activity {
            id,
            activity_type: activity.activity_type.unwrap_or(ActivityType::Success),
            icon: activity
                .icon
                .unwrap_or_else(|| DEFAULT_ACTIVITY_ICON.to_string()),
            message: activity.message,
            timestamp: activity.timestamp.unwrap_or(now),
        };

        inner.state.push_activity(activity.clone());

        self.hub
            .broadcast(&DashboardMessage::NewActivity(&activity))
            .await;

        activity
    }

    /// Records an error
    ///
    /// The message is logged at ERROR level and stored in the state
    /// (only the most recent errors are kept). Broadcasts state_update.
    pub async fn record_error(&self, message: &str) {
        self.logger.log_error(message);

        let mut inner = self.inner.lock().await;

        inner.state.push_error(ErrorEntry {
            message: message.to_string(),
            timestamp: Utc::now(),
        });

        self.hub
            .broadcast(&DashboardMessage::StateUpdate(&inner.state))
            .await;
    }

    /// Replaces the metrics
    ///
    /// # Arguments
    ///
    /// * `sampler` - Computes the new metrics from the current state
    ///
    /// Broadcasts metrics_update with the metrics only.
    pub async fn update_metrics<F>(&self, sampler: F)
    where
        F: FnOnce(&ServerState) -> ServerMetrics,
    {
        let mut inner = self.inner.lock().await;

        let metrics = sampler(&inner.state);
        inner.state.metrics = metrics;

        self.hub
            .broadcast(&DashboardMessage::MetricsUpdate(&inner.state.metrics))
            .await;
    }

    /// Subscribes a new viewer
    ///
    /// The subscription starts with an initial_state message containing
    /// the current state and the most recent lines of the log file.
    pub async fn subscribe_viewer(&self) -> Result<ViewerSubscription, ()> {
        let logs = match &self.log_file {
            Some(path) => get_recent_logs(path, self.initial_log_lines).await,
            None => Vec::new(),
        };

        // Holding the lock, so no change can be missed or arrive before the snapshot
        let inner = self.inner.lock().await;

        self.hub
            .subscribe(&DashboardMessage::InitialState {
                state: &inner.state,
                logs: &logs,
            })
            .await
    }
}
