use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

type Shared = Arc<Mutex<Vec<Notification>>>;

fn lock(list: &Shared) -> MutexGuard<'_, Vec<Notification>> {
    list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Short-lived user-facing messages. Every push schedules its own expiry
/// timer on the tokio runtime, so `push` must be called from within one.
pub struct NotificationChannel {
    ttl: Duration,
    next_id: u64,
    active: Shared,
    timers: HashMap<NotificationId, JoinHandle<()>>,
}

impl NotificationChannel {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_id: 1,
            active: Arc::new(Mutex::new(Vec::new())),
            timers: HashMap::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.reap_finished_timers();

        let id = NotificationId(self.next_id);
        self.next_id += 1;
        let message = message.into();
        debug!(id = id.0, %severity, %message, "notification pushed");

        lock(&self.active).push(Notification {
            id,
            message,
            severity,
            created_at: Instant::now(),
        });

        let active = self.active.clone();
        let ttl = self.ttl;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            lock(&active).retain(|notification| notification.id != id);
        });
        self.timers.insert(id, timer);

        id
    }

    pub fn error(&mut self, message: impl Into<String>) -> NotificationId {
        self.push(message, Severity::Error)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> NotificationId {
        self.push(message, Severity::Warning)
    }

    pub fn info(&mut self, message: impl Into<String>) -> NotificationId {
        self.push(message, Severity::Info)
    }

    /// Removes the notification now and cancels its timer. Unknown or
    /// already expired ids are ignored.
    pub fn dismiss(&mut self, id: NotificationId) {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
        lock(&self.active).retain(|notification| notification.id != id);
    }

    pub fn dismiss_oldest(&mut self) -> Option<NotificationId> {
        let oldest = lock(&self.active).first().map(|notification| notification.id)?;
        self.dismiss(oldest);
        Some(oldest)
    }

    /// Current notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        lock(&self.active).clone()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.active).is_empty()
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.timers.values().filter(|timer| !timer.is_finished()).count()
    }

    fn reap_finished_timers(&mut self) {
        self.timers.retain(|_, timer| !timer.is_finished());
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}
