// Media server lifecycle events

use std::net::IpAddr;

use serde::Deserialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Session of the media server an event refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSession {
    /// Session ID assigned by the media server
    pub session_id: String,

    /// Stream path (eg: /live/stream)
    pub stream_path: String,

    /// IP address of the client
    pub client_ip: IpAddr,
}

impl MediaSession {
    /// Gets the client IP for display (IPv4-mapped addresses as plain IPv4)
    pub fn get_display_ip(&self) -> String {
        self.client_ip.to_canonical().to_string()
    }
}

/// Lifecycle event of the media server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaServerEvent {
    /// A client connected
    Connect(MediaSession),

    /// A client is about to publish
    PrePublish(MediaSession),

    /// The camera started publishing
    PublishStart(MediaSession),

    /// The camera stopped publishing
    PublishStop(MediaSession),

    /// A player is about to play
    PrePlay {
        session: MediaSession,
        publisher_active: bool,
    },

    /// A player started receiving the stream
    PlayStart(MediaSession),

    /// A player stopped receiving the stream
    PlayStop(MediaSession),
}

impl MediaServerEvent {
    /// Gets the name of the event
    pub fn get_name(&self) -> &'static str {
        match self {
            MediaServerEvent::Connect(_) => "connect",
            MediaServerEvent::PrePublish(_) => "pre-publish",
            MediaServerEvent::PublishStart(_) => "publish-start",
            MediaServerEvent::PublishStop(_) => "publish-stop",
            MediaServerEvent::PrePlay { .. } => "pre-play",
            MediaServerEvent::PlayStart(_) => "play-start",
            MediaServerEvent::PlayStop(_) => "play-stop",
        }
    }

    /// Gets the session of the event
    pub fn get_session(&self) -> &MediaSession {
        match self {
            MediaServerEvent::Connect(s)
            | MediaServerEvent::PrePublish(s)
            | MediaServerEvent::PublishStart(s)
            | MediaServerEvent::PublishStop(s)
            | MediaServerEvent::PlayStart(s)
            | MediaServerEvent::PlayStop(s) => s,
            MediaServerEvent::PrePlay { session, .. } => session,
        }
    }
}

/// Event name, as sent by the media server
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEventName {
    Connect,
    PrePublish,
    PublishStart,
    PublishStop,
    PrePlay,
    PlayStart,
    PlayStop,
}

/// JSON body of an event delivered over HTTP
///
/// {"event":"publish_start","sessionId":"..","streamPath":"/live/stream","ip":"10.0.0.5"}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEventPayload {
    pub event: MediaEventName,

    pub session_id: String,

    #[serde(default)]
    pub stream_path: String,

    pub ip: IpAddr,

    /// Only meaningful for pre_play
    #[serde(default)]
    pub publisher_active: bool,
}

impl From<MediaEventPayload> for MediaServerEvent {
    fn from(payload: MediaEventPayload) -> MediaServerEvent {
        let session = MediaSession {
            session_id: payload.session_id,
            stream_path: payload.stream_path,
            client_ip: payload.ip,
        };

        match payload.event {
            MediaEventName::Connect => MediaServerEvent::Connect(session),
            MediaEventName::PrePublish => MediaServerEvent::PrePublish(session),
            MediaEventName::PublishStart => MediaServerEvent::PublishStart(session),
            MediaEventName::PublishStop => MediaServerEvent::PublishStop(session),
            MediaEventName::PrePlay => MediaServerEvent::PrePlay {
                session,
                publisher_active: payload.publisher_active,
            },
            MediaEventName::PlayStart => MediaServerEvent::PlayStart(session),
            MediaEventName::PlayStop => MediaServerEvent::PlayStop(session),
        }
    }
}

/// Receives the lifecycle callbacks of the media server.
/// Calls must return immediately.
pub trait MediaEventListener: Send + Sync {
    /// Called once per lifecycle transition
    fn on_media_event(&self, event: MediaServerEvent);
}

/// Listener that queues the events for the adapter task
#[derive(Clone)]
pub struct MediaEventSender {
    sender: UnboundedSender<MediaServerEvent>,
}

impl MediaEventListener for MediaEventSender {
    fn on_media_event(&self, event: MediaServerEvent) {
        // Fails only if the adapter is gone (shutting down)
        _ = self.sender.send(event);
    }
}

/// Creates the channel between the media server and the adapter task
pub fn media_event_channel() -> (MediaEventSender, UnboundedReceiver<MediaServerEvent>) {
    let (sender, receiver) = unbounded_channel::<MediaServerEvent>();
    (MediaEventSender { sender }, receiver)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_payload_to_event() {
        let payload: MediaEventPayload = serde_json::from_str(
            r#"{"event":"publish_start","sessionId":"A1","streamPath":"/live/stream","ip":"10.0.0.5"}"#,
        )
        .unwrap();

        let event = MediaServerEvent::from(payload);

        assert_eq!(event.get_name(), "publish-start");
        assert_eq!(
            event.get_session(),
            &MediaSession {
                session_id: "A1".to_string(),
                stream_path: "/live/stream".to_string(),
                client_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
            }
        );

        let payload: MediaEventPayload = serde_json::from_str(
            r#"{"event":"pre_play","sessionId":"B2","streamPath":"/live/stream","ip":"::ffff:10.0.0.9"}"#,
        )
        .unwrap();

        match MediaServerEvent::from(payload) {
            MediaServerEvent::PrePlay {
                session,
                publisher_active,
            } => {
                assert!(!publisher_active);
                assert_eq!(session.get_display_ip(), "10.0.0.9");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(serde_json::from_str::<MediaEventPayload>(
            r#"{"event":"explode","sessionId":"A1","ip":"10.0.0.5"}"#
        )
        .is_err());

        assert!(serde_json::from_str::<MediaEventPayload>(
            r#"{"event":"play_start","sessionId":"A1","ip":"not-an-ip"}"#
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_sender_queues_events_in_order() {
        let (sender, mut receiver) = media_event_channel();

        let session = MediaSession {
            session_id: "1".to_string(),
            stream_path: "/live/stream".to_string(),
            client_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        sender.on_media_event(MediaServerEvent::PublishStart(session.clone()));
        sender.on_media_event(MediaServerEvent::PublishStop(session));

        assert_eq!(receiver.recv().await.unwrap().get_name(), "publish-start");
        assert_eq!(receiver.recv().await.unwrap().get_name(), "publish-stop");
    }
}
