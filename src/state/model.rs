// Server state model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Max number of activities kept in the state
pub const MAX_ACTIVITIES: usize = 50;

/// Max number of errors kept in the state
pub const MAX_ERRORS: usize = 10;

/// Status of the relay, as shown in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Starting,
    WaitingCamera,
    CameraOnly,
    ObsWaitingCamera,
    Streaming,
    Error,
}

impl ServerStatus {
    /// Derives the status from the connection flags
    pub fn derive(camera_connected: bool, obs_connected: bool) -> ServerStatus {
        match (camera_connected, obs_connected) {
            (false, false) => ServerStatus::WaitingCamera,
            (true, false) => ServerStatus::CameraOnly,
            (false, true) => ServerStatus::ObsWaitingCamera,
            (true, true) => ServerStatus::Streaming,
        }
    }

    /// True if the camera is feeding the relay,
    /// so there is an incoming bitrate to report
    pub fn is_receiving_stream(&self) -> bool {
        matches!(self, ServerStatus::Streaming | ServerStatus::CameraOnly)
    }
}

/// Performance metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetrics {
    /// Seconds since the process started
    pub uptime: u64,

    /// Incoming bitrate (Mbps)
    pub bitrate: f64,

    pub dropped_frames: u32,

    /// CPU usage (%)
    pub cpu: f64,

    /// Memory usage (MB)
    pub memory: u64,
}

/// Activity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Success,
    Warning,
    Error,
}

/// Entry of the activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,

    #[serde(rename = "type")]
    pub activity_type: ActivityType,

    /// Display hint for the dashboard
    pub icon: String,

    pub message: String,

    pub timestamp: DateTime<Utc>,
}

/// Error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Server state, shared with every dashboard viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerState {
    pub status: ServerStatus,

    pub camera_connected: bool,

    #[serde(rename = "cameraIP")]
    pub camera_ip: Option<String>,

    pub obs_connected: bool,

    #[serde(rename = "obsIP")]
    pub obs_ip: Option<String>,

    pub last_event: Option<String>,

    pub last_event_time: Option<DateTime<Utc>>,

    pub start_time: DateTime<Utc>,

    pub metrics: ServerMetrics,

    /// Newest first
    pub activities: Vec<Activity>,

    /// Newest first
    pub errors: Vec<ErrorEntry>,
}

impl ServerState {
    /// Creates the state of a process that just started
    pub fn new(start_time: DateTime<Utc>) -> ServerState {
        ServerState {
            status: ServerStatus::Starting,
            camera_connected: false,
            camera_ip: None,
            obs_connected: false,
            obs_ip: None,
            last_event: Some("Starting server...".to_string()),
            last_event_time: Some(start_time),
            start_time,
            metrics: ServerMetrics::default(),
            activities: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Status derived from the current connection flags
    pub fn derived_status(&self) -> ServerStatus {
        ServerStatus::derive(self.camera_connected, self.obs_connected)
    }

    /// Seconds elapsed since start_time
    pub fn uptime_at(&self, now: DateTime<Utc>) -> u64 {
        (now - self.start_time).num_seconds().max(0) as u64
    }

    /// Adds an activity at the front, dropping the oldest ones over the limit
    pub fn push_activity(&mut self, activity: Activity) {
        self.activities.insert(0, activity);
        self.activities.truncate(MAX_ACTIVITIES);
    }

    /// Adds an error at the front, dropping the oldest ones over the limit
    pub fn push_error(&mut self, error: ErrorEntry) {
        self.errors.insert(0, error);
        self.errors.truncate(MAX_ERRORS);
    }
}
