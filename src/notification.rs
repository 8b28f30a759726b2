//! Transient user-facing notifications with auto-expiry.
//!
//! DESIGN
//! ======
//! Each message with a positive timeout owns a spawned expiry task. The task
//! holds only a weak reference to the store, and removing the message aborts
//! it, so a dropped store or a manually dismissed message never leaves a
//! timer touching stale state. Changes are published on a `watch` channel so
//! UI code can re-render without polling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use uuid::Uuid;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Notification severity, serialized as the lowercase name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Error,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub id: Uuid,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

struct StoreInner {
    messages: Vec<NotificationMessage>,
    timers: HashMap<Uuid, AbortHandle>,
    tx: watch::Sender<Vec<NotificationMessage>>,
}

impl StoreInner {
    fn publish(&self) {
        self.tx.send_replace(self.messages.clone());
    }
}

/// Shared handle to the notification list.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl NotificationStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { inner: Arc::new(Mutex::new(StoreInner { messages: Vec::new(), timers: HashMap::new(), tx })) }
    }

    /// Push a message and schedule its removal after `timeout`.
    ///
    /// A zero `timeout` keeps the message until [`NotificationStore::remove`].
    pub fn add(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        title: Option<String>,
        timeout: Duration,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        inner
            .messages
            .push(NotificationMessage { id, message: message.into(), title, kind });

        if !timeout.is_zero() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let weak = Arc::downgrade(&self.inner);
                    let task = handle.spawn(expire_after(weak, id, timeout));
                    inner.timers.insert(id, task.abort_handle());
                }
                Err(_) => {
                    tracing::warn!(%id, "no async runtime; notification will not auto-expire");
                }
            }
        }

        inner.publish();
        id
    }

    /// Remove a message and cancel its pending expiry. Unknown ids are ignored.
    pub fn remove(&self, id: Uuid) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = inner.timers.remove(&id) {
            timer.abort();
        }
        remove_message(&mut inner, id);
    }

    pub fn info(&self, message: impl Into<String>, title: Option<String>, timeout: Option<Duration>) -> Uuid {
        self.add(message, NotificationKind::Info, title, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn error(&self, message: impl Into<String>, title: Option<String>, timeout: Option<Duration>) -> Uuid {
        self.add(message, NotificationKind::Error, title, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn success(&self, message: impl Into<String>, title: Option<String>, timeout: Option<Duration>) -> Uuid {
        self.add(message, NotificationKind::Success, title, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn warning(&self, message: impl Into<String>, title: Option<String>, timeout: Option<Duration>) -> Uuid {
        self.add(message, NotificationKind::Warning, title, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Snapshot of the current messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .messages
            .clone()
    }

    /// Receiver that observes every change to the message list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<NotificationMessage>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tx
            .subscribe()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn expire_after(store: Weak<Mutex<StoreInner>>, id: Uuid, timeout: Duration) {
    tokio::time::sleep(timeout).await;
    let Some(inner) = store.upgrade() else {
        return;
    };
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    inner.timers.remove(&id);
    remove_message(&mut inner, id);
}

fn remove_message(inner: &mut StoreInner, id: Uuid) {
    let before = inner.messages.len();
    inner.messages.retain(|m| m.id != id);
    if inner.messages.len() != before {
        inner.publish();
    }
}

#[cfg(test)]
#[path = "notification_test.rs"]
mod tests;
