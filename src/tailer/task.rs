// Log tailer task

use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::{
    hub::{BroadcastHub, DashboardMessage},
    log::Logger,
    log_debug,
};

use super::LogTailer;

/// Spawns a task to broadcast the new lines of the log file
///
/// # Arguments
///
/// * `logger` - The logger
/// * `path` - Path of the log file
/// * `interval` - Time between checks
/// * `hub` - Hub to broadcast new_logs messages
/// * `cancel_receiver` - Receiver to listen for cancellation of the task
pub fn spawn_task_log_tailer(
    logger: Arc<Logger>,
    path: PathBuf,
    interval: Duration,
    hub: Arc<BroadcastHub>,
    mut cancel_receiver: Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tailer = LogTailer::new(&path);

        loop {
            // Wait
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel_receiver.recv() => {
                    break;
                }
            }

            let lines = match tailer.poll().await {
                Ok(l) => l,
                Err(e) => {
                    // Probably in the middle of a rotation, try again on the next tick
                    log_debug!(logger, format!("Could not read {}: {}", path.display(), e));
                    continue;
                }
            };

            if !lines.is_empty() {
                hub.broadcast(&DashboardMessage::NewLogs(&lines)).await;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn test_tailer_task_broadcasts_appended_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "L1\n").unwrap();

        let logger = Arc::new(Logger::new_disabled());
        let hub = Arc::new(BroadcastHub::new(logger.clone()));

        let state = crate::state::ServerState::new(chrono::Utc::now());
        let mut sub = hub
            .subscribe(&DashboardMessage::InitialState {
                state: &state,
                logs: &[],
            })
            .await
            .unwrap();
        _ = sub.receiver.recv().await;

        let (cancel_sender, cancel_receiver) = tokio::sync::mpsc::channel::<()>(1);
        let handle = spawn_task_log_tailer(
            logger,
            path.clone(),
            Duration::from_millis(20),
            hub,
            cancel_receiver,
        );

        // First tick: the whole file
        let msg = sub.receiver.recv().await.unwrap();
        let v: Value = serde_json::from_str(msg.as_str()).unwrap();
        assert_eq!(v["type"], "new_logs");
        assert_eq!(v["data"], serde_json::json!(["L1"]));

        {
            use std::io::Write;
            let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(b"L2\nL3\n").unwrap();
        }

        // Next tick: only the appended lines
        let msg = sub.receiver.recv().await.unwrap();
        let v: Value = serde_json::from_str(msg.as_str()).unwrap();
        assert_eq!(v["data"], serde_json::json!(["L2", "L3"]));

        cancel_sender.send(()).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_tracing_does_not_feed_the_tailed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "L1\n").unwrap();

        let mut config = Logger::new_disabled().config;
        config.file = Some(path.clone());
        config.trace_enabled = true;
        config.debug_enabled = true;

        let logger = Arc::new(Logger::new(config));
        let hub = Arc::new(BroadcastHub::new(logger.clone()));

        let (cancel_sender, cancel_receiver) = tokio::sync::mpsc::channel::<()>(1);
        let handle = spawn_task_log_tailer(
            logger,
            path.clone(),
            Duration::from_millis(20),
            hub,
            cancel_receiver,
        );

        tokio::time::sleep(Duration::from_millis(400)).await;

        cancel_sender.send(()).await.unwrap();
        handle.await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "L1\n");
    }
}
