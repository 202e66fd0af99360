// Partial updates accepted by the state store

use chrono::{DateTime, TimeZone, Utc};
use serde::{de::Error as DeError, Deserialize, Deserializer};

use super::{ActivityType, ServerStatus};

/// Partial server state
///
/// Every field set to Some replaces the current value.
/// For nullable fields, Some(None) clears the value,
/// while None leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStateUpdate {
    /// Forced status, skips the derivation
    #[serde(default)]
    pub status: Option<ServerStatus>,

    #[serde(default)]
    pub camera_connected: Option<bool>,

    #[serde(default, rename = "cameraIP", deserialize_with = "deserialize_nullable")]
    pub camera_ip: Option<Option<String>>,

    #[serde(default)]
    pub obs_connected: Option<bool>,

    #[serde(default, rename = "obsIP", deserialize_with = "deserialize_nullable")]
    pub obs_ip: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub last_event: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_nullable_timestamp")]
    pub last_event_time: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
}

impl ServerStateUpdate {
    /// True if the update changes any of the connection flags
    pub fn changes_connections(&self) -> bool {
        self.camera_connected.is_some() || self.obs_connected.is_some()
    }

    /// Update describing a new event, stamped with the current time
    pub fn event(message: &str) -> ServerStateUpdate {
        ServerStateUpdate {
            last_event: Some(Some(message.to_string())),
            last_event_time: Some(Some(Utc::now())),
            ..Default::default()
        }
    }
}

/// Activity to record. Missing fields are filled by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default, rename = "type")]
    pub activity_type: Option<ActivityType>,

    #[serde(default)]
    pub icon: Option<String>,

    pub message: String,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewActivity {
    /// Creates a new activity with a type, an icon and a message
    pub fn new(activity_type: ActivityType, icon: &str, message: &str) -> NewActivity {
        NewActivity {
            id: None,
            activity_type: Some(activity_type),
            icon: Some(icon.to_string()),
            message: message.to_string(),
            timestamp: None,
        }
    }
}

/// Timestamp as received from a client:
/// epoch milliseconds or an RFC 3339 string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FloatMillis(f64),
    Text(String),
}

impl RawTimestamp {
    fn normalize(self) -> Result<DateTime<Utc>, String> {
        match self {
            RawTimestamp::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| format!("timestamp out of range: {}", ms)),
            RawTimestamp::FloatMillis(ms) => RawTimestamp::Millis(ms as i64).normalize(),
            RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp '{}': {}", s, e)),
        }
    }
}

fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(raw) => raw.normalize().map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}

fn deserialize_nullable_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_timestamp(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_parsing() {
        let update: ServerStateUpdate =
            serde_json::from_str(r#"{"cameraConnected":true,"cameraIP":"10.0.0.5"}"#).unwrap();

        assert_eq!(update.camera_connected, Some(true));
        assert_eq!(update.camera_ip, Some(Some("10.0.0.5".to_string())));
        assert_eq!(update.obs_ip, None);
        assert!(update.status.is_none());
        assert!(update.changes_connections());

        let update: ServerStateUpdate =
            serde_json::from_str(r#"{"cameraIP":null,"status":"error"}"#).unwrap();

        assert_eq!(update.camera_ip, Some(None));
        assert_eq!(update.status, Some(ServerStatus::Error));
        assert!(!update.changes_connections());
    }

    #[test]
    fn test_timestamp_normalization() {
        let update: ServerStateUpdate = serde_json::from_str(
            r#"{"startTime":1700000000000,"lastEventTime":"2024-01-02T03:04:05.678Z"}"#,
        )
        .unwrap();

        assert_eq!(update.start_time.unwrap().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(
            update.last_event_time.unwrap().unwrap().timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap().timestamp_millis() + 678
        );

        let update: ServerStateUpdate =
            serde_json::from_str(r#"{"lastEventTime":null}"#).unwrap();
        assert_eq!(update.last_event_time, Some(None));

        assert!(serde_json::from_str::<ServerStateUpdate>(r#"{"startTime":"yesterday"}"#).is_err());
    }

    #[test]
    fn test_invalid_update_rejected() {
        assert!(serde_json::from_str::<ServerStateUpdate>("{not json").is_err());
        assert!(serde_json::from_str::<ServerStateUpdate>(r#"{"status":"dancing"}"#).is_err());
        assert!(serde_json::from_str::<ServerStateUpdate>(r#"{"cameraConnected":"yes"}"#).is_err());
    }

    #[test]
    fn test_new_activity_parsing() {
        let activity: NewActivity =
            serde_json::from_str(r#"{"type":"error","message":"disk full"}"#).unwrap();

        assert_eq!(activity.activity_type, Some(ActivityType::Error));
        assert_eq!(activity.message, "disk full");
        assert!(activity.icon.is_none());
        assert!(activity.id.is_none());
        assert!(activity.timestamp.is_none());

        assert!(serde_json::from_str::<NewActivity>(r#"{"type":"error"}"#).is_err());
    }
}
