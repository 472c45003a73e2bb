use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    /// `None` keeps the toast until dismissed.
    pub duration: Option<Duration>,
    pub created_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.duration {
            Some(duration) => now.saturating_duration_since(self.created_at) >= duration,
            None => false,
        }
    }
}

#[derive(Debug)]
struct ToastMessage {
    kind: ToastKind,
    message: String,
    duration: Option<Duration>,
}

/// Cloneable handle for raising notifications from anywhere.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: mpsc::UnboundedSender<ToastMessage>,
}

impl Notifier {
    /// `duration` of `None` uses the store's default; `Some(Duration::ZERO)` is sticky.
    pub fn show(&self, kind: ToastKind, message: impl Into<String>, duration: Option<Duration>) {
        let message = ToastMessage {
            kind,
            message: message.into(),
            duration,
        };
        if self.sender.send(message).is_err() {
            tracing::trace!("toast store dropped; notification discarded");
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message, None);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message, None);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastKind::Info, message, None);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.show(ToastKind::Warning, message, None);
    }
}

/// Visible notifications, fed by any number of [`Notifier`]s.
#[derive(Debug)]
pub struct ToastStore {
    sender: mpsc::UnboundedSender<ToastMessage>,
    receiver: mpsc::UnboundedReceiver<ToastMessage>,
    toasts: Vec<Toast>,
    next_id: ToastId,
    default_duration: Duration,
}

impl ToastStore {
    pub fn new(default_duration: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            toasts: Vec::new(),
            next_id: 1,
            default_duration,
        }
    }

    pub fn notifier(&self) -> Notifier {
        Notifier {
            sender: self.sender.clone(),
        }
    }

    /// Moves queued notifications into the visible list. Returns how many arrived.
    pub fn drain(&mut self) -> usize {
        let mut received = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.push(message.kind, message.message, message.duration);
            received += 1;
        }
        received
    }

    pub fn push(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;
        let duration = match duration.unwrap_or(self.default_duration) {
            d if d.is_zero() => None,
            d => Some(d),
        };
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
            duration,
            created_at: Instant::now(),
        });
        id
    }

    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    /// Drops every toast whose duration has elapsed at `now`.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|toast| !toast.is_expired(now));
        before - self.toasts.len()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}
