//! Out-of-process alerts for the end of a session.
//!
//! Delivery is best effort. The session machine never waits on, or checks,
//! whether a notification was actually shown.

use crate::error::NotifyError;
use chrono::{DateTime, Utc};
use focusbeat_ipc::SessionMode;
use std::time::Duration as StdDuration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Wall-clock recheck interval while waiting to fire. Tokio timers follow the
/// monotonic clock, which stops during system sleep.
const RECHECK: StdDuration = StdDuration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationHandle(pub u64);

pub trait NotificationScheduler {
    fn schedule(
        &mut self,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<NotificationHandle, NotifyError>;

    fn cancel_all(&mut self);
}

/// Title and body announcing the end of a session of mode `ended`.
pub fn expiry_text(ended: SessionMode) -> (&'static str, &'static str) {
    match ended {
        SessionMode::Focus => ("Focus complete", "Time for a break."),
        SessionMode::Break => ("Break over", "Time to focus."),
    }
}

/// Shows desktop notifications through `notify-rust` from tasks on a tokio runtime.
pub struct DesktopScheduler {
    handle: Option<Handle>,
    pending: Vec<JoinHandle<()>>,
    next_id: u64,
}

impl DesktopScheduler {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Uses the runtime of the calling context, if any.
    #[cfg(test)]
    fn current() -> Self {
        Self {
            handle: Handle::try_current().ok(),
            pending: Vec::new(),
            next_id: 1,
        }
    }

    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.pending.iter().filter(|t| !t.is_finished()).count()
    }
}

impl NotificationScheduler for DesktopScheduler {
    fn schedule(
        &mut self,
        fire_at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<NotificationHandle, NotifyError> {
        let handle = self.handle.as_ref().ok_or(NotifyError::NoRuntime)?;
        if (fire_at - Utc::now()).to_std().is_ok_and(|d| d > StdDuration::from_secs(86_400)) {
            return Err(NotifyError::OutOfRange);
        }

        self.pending.retain(|t| !t.is_finished());
        let id = self.next_id;
        self.next_id += 1;

        let title = title.to_string();
        let body = body.to_string();
        let task = handle.spawn(async move {
            loop {
                match (fire_at - Utc::now()).to_std() {
                    Ok(left) if !left.is_zero() => tokio::time::sleep(left.min(RECHECK)).await,
                    _ => break,
                }
            }
            let shown = tokio::task::spawn_blocking(move || {
                notify_rust::Notification::new()
                    .summary(&title)
                    .body(&body)
                    .appname("focusbeat")
                    .show()
                    .map(|_| ())
            })
            .await;
            match shown {
                Ok(Ok(())) => info!(id, "notification delivered"),
                Ok(Err(e)) => warn!(id, "Failed to send notification: {}", e),
                Err(e) => warn!(id, "Notification task failed: {}", e),
            }
        });
        self.pending.push(task);
        debug!(id, %fire_at, "notification scheduled");
        Ok(NotificationHandle(id))
    }

    fn cancel_all(&mut self) {
        let cancelled = self.pending.len();
        for task in self.pending.drain(..) {
            task.abort();
        }
        if cancelled > 0 {
            debug!(cancelled, "notifications cancelled");
        }
    }
}

impl Drop for DesktopScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
