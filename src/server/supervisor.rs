// Background task supervision

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::task::{JoinError, JoinHandle};

use crate::state::{ActivityType, NewActivity, StateStore};

/// Flag set once the process starts shutting down.
/// Tasks ending after that are not reported.
#[derive(Clone)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Creates new ShutdownFlag
    pub fn new() -> ShutdownFlag {
        ShutdownFlag {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the flag
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Checks the flag
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Gets the message describing why a background task ended
fn describe_task_end(name: &str, result: Result<(), JoinError>) -> String {
    match result {
        Ok(()) => format!("Critical error: task {} ended unexpectedly", name),
        Err(e) if e.is_panic() => {
            let panic = e.into_panic();

            let reason = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };

            format!("Critical error: task {} panicked: {}", name, reason)
        }
        Err(_) => format!("Critical error: task {} was cancelled", name),
    }
}

/// Spawns a task to watch a background task
///
/// If the task ends before the shutdown, the fault is recorded
/// (ERROR log line, errors entry and error activity). The process keeps running.
///
/// # Arguments
///
/// * `store` - The state store, to record the fault
/// * `name` - Name of the task, for the messages
/// * `handle` - Handle of the task
/// * `shutdown` - Shutdown flag
pub fn spawn_task_supervisor(
    store: Arc<StateStore>,
    name: &'static str,
    handle: JoinHandle<()>,
    shutdown: ShutdownFlag,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = handle.await;

        if shutdown.is_set() {
            return;
        }

        let message = describe_task_end(name, result);

        store.record_error(&message).await;
        store
            .record_activity(NewActivity::new(
                ActivityType::Error,
                "alert-triangle",
                &message,
            ))
            .await;
    })
}
