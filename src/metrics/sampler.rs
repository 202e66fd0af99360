// Metrics sampler

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::state::{ServerMetrics, ServerState, StateStore};

use super::MetricsProvider;

/// Builds the metrics of the current tick
///
/// The bitrate is only reported while the relay is receiving a stream,
/// otherwise it is exactly 0.
pub fn sample_metrics(
    provider: &mut dyn MetricsProvider,
    state: &ServerState,
    now: DateTime<Utc>,
) -> ServerMetrics {
    let sample = provider.sample();

    ServerMetrics {
        uptime: state.uptime_at(now),
        bitrate: if state.status.is_receiving_stream() {
            sample.bitrate
        } else {
            0.0
        },
        dropped_frames: sample.dropped_frames,
        cpu: sample.cpu,
        memory: sample.memory,
    }
}

/// Spawns a task to sample the metrics periodically
///
/// # Arguments
///
/// * `store` - The state store, receives the new metrics
/// * `provider` - The metrics provider
/// * `interval` - Time between samples
/// * `cancel_receiver` - Receiver to listen for cancellation of the task
pub fn spawn_task_metrics_sampler(
    store: Arc<StateStore>,
    mut provider: Box<dyn MetricsProvider>,
    interval: Duration,
    mut cancel_receiver: Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel_receiver.recv() => {
                    break;
                }
            }

            store
                .update_metrics(|state| sample_metrics(provider.as_mut(), state, Utc::now()))
                .await;
        }
    })
}
