// Messages pushed to the dashboard viewers

use serde::Serialize;
use tungstenite::Utf8Bytes;

use crate::state::{Activity, ServerMetrics, ServerState};

/// Message sent to every viewer channel
///
/// Serialized as { "type": <tag>, "data": <payload> }
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DashboardMessage<'a> {
    /// First message of every subscription
    InitialState {
        state: &'a ServerState,
        logs: &'a [String],
    },

    /// Full state after a change
    StateUpdate(&'a ServerState),

    NewActivity(&'a Activity),

    /// New log lines, oldest first
    NewLogs(&'a [String]),

    MetricsUpdate(&'a ServerMetrics),
}

impl DashboardMessage<'_> {
    /// Gets the message tag
    pub fn get_type(&self) -> &'static str {
        match self {
            DashboardMessage::InitialState { .. } => "initial_state",
            DashboardMessage::StateUpdate(_) => "state_update",
            DashboardMessage::NewActivity(_) => "new_activity",
            DashboardMessage::NewLogs(_) => "new_logs",
            DashboardMessage::MetricsUpdate(_) => "metrics_update",
        }
    }

    /// Serializes the message into a websocket text payload
    pub fn serialize(&self) -> Result<Utf8Bytes, String> {
        serde_json::to_string(self)
            .map(Utf8Bytes::from)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_message_envelope() {
        let state = ServerState::new(Utc::now());
        let logs = vec!["[2024-01-01T00:00:00.000Z] [INFO] hello".to_string()];

        let msg = DashboardMessage::InitialState {
            state: &state,
            logs: &logs,
        };
        assert_eq!(msg.get_type(), "initial_state");

        let v: Value = serde_json::from_str(msg.serialize().unwrap().as_str()).unwrap();
        assert_eq!(v["type"], "initial_state");
        assert_eq!(v["data"]["state"]["status"], "starting");
        assert_eq!(v["data"]["logs"][0], logs[0]);

        let msg = DashboardMessage::NewLogs(&logs);
        let v: Value = serde_json::from_str(msg.serialize().unwrap().as_str()).unwrap();
        assert_eq!(v["type"], "new_logs");
        assert_eq!(v["data"], serde_json::json!(logs));

        let msg = DashboardMessage::MetricsUpdate(&state.metrics);
        let v: Value = serde_json::from_str(msg.serialize().unwrap().as_str()).unwrap();
        assert_eq!(v["type"], "metrics_update");
        assert_eq!(v["data"]["uptime"], 0);
        assert!(v["data"].get("status").is_none());

        let msg = DashboardMessage::StateUpdate(&state);
        let v: Value = serde_json::from_str(msg.serialize().unwrap().as_str()).unwrap();
        assert_eq!(v["type"], "state_update");
        assert_eq!(v["data"]["cameraConnected"], false);
    }
}
