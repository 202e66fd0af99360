// Broadcast hub

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    Mutex,
};
use tungstenite::Utf8Bytes;

use crate::{log::Logger, log_debug, log_error, log_trace};

use super::DashboardMessage;

/// Handle of a viewer channel registered in the hub
#[derive(Clone)]
pub struct ViewerHandle {
    /// Channel ID
    pub id: u64,

    /// False once the transport started closing
    open: Arc<AtomicBool>,
}

impl ViewerHandle {
    /// Marks the channel as closing.
    /// The hub skips it from now on, until it is unsubscribed.
    pub fn mark_closing(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

/// Subscription of a viewer channel
pub struct ViewerSubscription {
    /// Handle to unsubscribe
    pub handle: ViewerHandle,

    /// Queue of serialized messages for the viewer, in publish order
    pub receiver: UnboundedReceiver<Utf8Bytes>,
}

/// Registered viewer channel
struct ViewerChannel {
    sender: UnboundedSender<Utf8Bytes>,
    open: Arc<AtomicBool>,
}

/// Hub that fans out dashboard messages to every viewer
pub struct BroadcastHub {
    /// Logger
    logger: Arc<Logger>,

    /// Registered channels
    channels: Mutex<HashMap<u64, ViewerChannel>>,

    /// Next channel ID
    next_id: AtomicU64,
}

impl BroadcastHub {
    /// Creates new BroadcastHub
    pub fn new(logger: Arc<Logger>) -> BroadcastHub {
        BroadcastHub {
            logger,
            channels: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a viewer channel
    ///
    /// # Arguments
    ///
    /// * `initial` - Message queued before anything else (initial_state)
    ///
    /// # Return value
    ///
    /// Returns the subscription, or Err if the initial message
    /// could not be serialized
    pub async fn subscribe(
        &self,
        initial: &DashboardMessage<'_>,
    ) -> Result<ViewerSubscription, ()> {
        let logger = &self.logger;

        let payload = match initial.serialize() {
            Ok(p) => p,
            Err(e) => {
                log_error!(logger, format!("Could not serialize {}: {}", initial.get_type(), e));
                return Err(());
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let open = Arc::new(AtomicBool::new(true));
        let (sender, receiver) = unbounded_channel::<Utf8Bytes>();

        // Queued before registering, so it is always the first message
        _ = sender.send(payload);

        let mut channels = self.channels.lock().await;
        channels.insert(
            id,
            ViewerChannel {
                sender,
                open: open.clone(),
            },
        );
        let count = channels.len();
        drop(channels);

        log_debug!(logger, format!("Viewer #{} subscribed. Total: {}", id, count));

        Ok(ViewerSubscription {
            handle: ViewerHandle { id, open },
            receiver,
        })
    }

    /// Removes a viewer channel. Removing it twice is a no-op.
    pub async fn unsubscribe(&self, handle: &ViewerHandle) {
        handle.mark_closing();

        let mut channels = self.channels.lock().await;

        if channels.remove(&handle.id).is_some() {
            let count = channels.len();
            drop(channels);

            let logger = &self.logger;
            log_debug!(logger, format!("Viewer #{} unsubscribed. Total: {}", handle.id, count));
        }
    }

    /// Sends a message to every open viewer channel
    ///
    /// The message is serialized once. Channels that are closing are skipped.
    /// Channels whose receiving side is gone are removed.
    ///
    /// # Return value
    ///
    /// Returns the number of channels the message was queued for
    pub async fn broadcast(&self, message: &DashboardMessage<'_>) -> usize {
        let logger = &self.logger;

        let payload = match message.serialize() {
            Ok(p) => p,
            Err(e) => {
                log_error!(logger, format!("Could not serialize {}: {}", message.get_type(), e));
                return 0;
            }
        };

        let mut channels = self.channels.lock().await;

        let mut delivered: usize = 0;
        let mut gone: Vec<u64> = Vec::new();

        for (id, channel) in channels.iter() {
            if !channel.open.load(Ordering::SeqCst) {
                continue;
            }

            if channel.sender.send(payload.clone()).is_ok() {
                delivered += 1;
            } else {
                gone.push(*id);
            }
        }

        for id in gone {
            channels.remove(&id);
            log_debug!(logger, format!("Viewer #{} is gone, removed", id));
        }

        drop(channels);

        // Tracing new_logs would append to the tailed file and feed the next tick
        if !matches!(message, DashboardMessage::NewLogs(_)) {
            log_trace!(
                logger,
                format!("Broadcast {} to {} viewers", message.get_type(), delivered)
            );
        }

        delivered
    }

    /// Drops every viewer channel, closing their transports
    pub async fn close_all(&self) {
        let mut channels = self.channels.lock().await;

        for channel in channels.values() {
            channel.open.store(false, Ordering::SeqCst);
        }

        channels.clear();
    }

    /// Gets the number of registered viewer channels
    pub async fn viewer_count(&self) -> usize {
        self.channels.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::Value;

    use super::*;
    use crate::state::ServerState;

    fn type_of(payload: &Utf8Bytes) -> String {
        let v: Value = serde_json::from_str(payload.as_str()).unwrap();
        v["type"].as_str().unwrap().to_string()
    }

    fn new_hub() -> BroadcastHub {
        BroadcastHub::new(Arc::new(Logger::new_disabled()))
    }

    #[tokio::test]
    async fn test_initial_message_comes_first() {
        let hub = new_hub();
        let state = ServerState::new(Utc::now());
        let logs: Vec<String> = vec![];

        let mut sub = hub
            .subscribe(&DashboardMessage::InitialState {
                state: &state,
                logs: &logs,
            })
            .await
            .unwrap();

        hub.broadcast(&DashboardMessage::StateUpdate(&state)).await;
        hub.broadcast(&DashboardMessage::MetricsUpdate(&state.metrics)).await;

        assert_eq!(type_of(&sub.receiver.recv().await.unwrap()), "initial_state");
        assert_eq!(type_of(&sub.receiver.recv().await.unwrap()), "state_update");
        assert_eq!(type_of(&sub.receiver.recv().await.unwrap()), "metrics_update");
        assert!(sub.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fan_out_and_unsubscribe() {
        let hub = new_hub();
        let state = ServerState::new(Utc::now());
        let logs: Vec<String> = vec![];
        let initial = DashboardMessage::InitialState {
            state: &state,
            logs: &logs,
        };

        let mut sub_a = hub.subscribe(&initial).await.unwrap();
        let mut sub_b = hub.subscribe(&initial).await.unwrap();

        assert_ne!(sub_a.handle.id, sub_b.handle.id);
        assert_eq!(hub.viewer_count().await, 2);

        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(hub.broadcast(&DashboardMessage::NewLogs(&lines)).await, 2);

        hub.unsubscribe(&sub_a.handle).await;
        hub.unsubscribe(&sub_a.handle).await;

        assert_eq!(hub.viewer_count().await, 1);
        assert_eq!(hub.broadcast(&DashboardMessage::StateUpdate(&state)).await, 1);

        // A: initial + new_logs
        assert_eq!(type_of(&sub_a.receiver.recv().await.unwrap()), "initial_state");
        assert_eq!(type_of(&sub_a.receiver.recv().await.unwrap()), "new_logs");
        assert!(sub_a.receiver.recv().await.is_none());

        // B: initial + new_logs + state_update
        assert_eq!(type_of(&sub_b.receiver.recv().await.unwrap()), "initial_state");
        assert_eq!(type_of(&sub_b.receiver.recv().await.unwrap()), "new_logs");
        assert_eq!(type_of(&sub_b.receiver.recv().await.unwrap()), "state_update");
    }

    #[tokio::test]
    async fn test_closing_and_dropped_channels() {
        let hub = new_hub();
        let state = ServerState::new(Utc::now());
        let logs: Vec<String> = vec![];
        let initial = DashboardMessage::InitialState {
            state: &state,
            logs: &logs,
        };

        let closing = hub.subscribe(&initial).await.unwrap();
        let dropped = hub.subscribe(&initial).await.unwrap();
        let mut alive = hub.subscribe(&initial).await.unwrap();

        closing.handle.mark_closing();
        drop(dropped.receiver);

        assert_eq!(hub.broadcast(&DashboardMessage::StateUpdate(&state)).await, 1);

        // Closing channel is skipped but kept, dropped channel is removed
        assert_eq!(hub.viewer_count().await, 2);

        assert_eq!(type_of(&alive.receiver.recv().await.unwrap()), "initial_state");
        assert_eq!(type_of(&alive.receiver.recv().await.unwrap()), "state_update");

        hub.close_all().await;
        assert_eq!(hub.viewer_count().await, 0);
        assert!(alive.receiver.recv().await.is_none());
    }
}
