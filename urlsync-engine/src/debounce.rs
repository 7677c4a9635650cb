//! Trailing-edge debounce with a single timer slot.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs only the most recently scheduled action, once its delay elapses
/// without another schedule.
///
/// Scheduling aborts the pending timer and starts a new one. A timer that
/// already fired hands its action to a separate task, so a later schedule
/// never interrupts an action that is running.
#[derive(Debug, Default)]
pub struct Debouncer {
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` after `delay`, replacing any pending one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap();
        if let Some(pending) = slot.take() {
            pending.abort();
        }
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action);
        }));
    }

    /// Drops the pending action, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.slot.lock().unwrap().take() {
            pending.abort();
        }
    }

    /// Returns true while a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
