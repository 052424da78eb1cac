//! Transient user notifications.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::error::{HttpFailure, InvokeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// De-duplication key; equal keys collapse into one visible toast.
    pub key: String,
    pub level: Level,
    pub message: String,
    /// Structured failure, rendered distinctly by error-styled displays.
    pub detail: Option<HttpFailure>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { key: format!("success:{message}"), level: Level::Success, message, detail: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self { key: format!("error:{message}"), level: Level::Error, message, detail: None }
    }

    pub fn from_invoke_error(err: &InvokeError) -> Self {
        Self { detail: err.http_failure(), ..Self::error(err.message()) }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, n: Notification);
}

/// Log the failure for developers and emit exactly one error notification.
pub fn report_invoke_error(sink: &dyn NotificationSink, err: &InvokeError) {
    error!(error = %err, "invoke failed");
    metrics::counter!("picker_invoke_errors_total", 1u64);
    sink.notify(Notification::from_invoke_error(err));
}

/// Sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.level {
            Level::Success => info!(key = %n.key, "notify: {}", n.message),
            Level::Error => error!(key = %n.key, "notify: {}", n.message),
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    n: Notification,
    created: Instant,
    duration: Duration,
}

/// Toast list: de-duplicated by key, dismissible, auto-expiring; newest last.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Toast>> {
        self.toasts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Visible notifications at `now`, expired ones dropped.
    pub fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let mut toasts = self.lock();
        toasts.retain(|t| now.saturating_duration_since(t.created) < t.duration);
        toasts.iter().map(|t| t.n.clone()).collect()
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }

    pub fn dismiss(&self, key: &str) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| t.n.key != key);
        toasts.len() != before
    }

    pub fn len(&self) -> usize { self.lock().len() }
    pub fn is_empty(&self) -> bool { self.lock().is_empty() }
}

impl NotificationSink for ToastQueue {
    fn notify(&self, n: Notification) {
        let duration = match n.level { Level::Error => Duration::from_millis(5000), Level::Success => Duration::from_millis(3000) };
        let mut toasts = self.lock();
        // a repeated key refreshes the toast and moves it to the end
        toasts.retain(|t| t.n.key != n.key);
        toasts.push(Toast { n, created: Instant::now(), duration });
    }
}
