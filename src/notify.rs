//! Transient notifications shown after an action

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::Error;

/// How long a toast stays visible unless given another duration
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Info => "info",
            ToastKind::Warning => "warning",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub duration: Duration,
    created_at: Instant,
}

impl Toast {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= self.duration
    }
}

#[derive(Debug, Default)]
struct Queue {
    next_id: u64,
    toasts: VecDeque<Toast>,
}

/// Shared toast queue
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    inner: Arc<Mutex<Queue>>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_queue<R>(&self, f: impl FnOnce(&mut Queue) -> R) -> R {
        let mut queue = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut queue)
    }

    pub fn push(&self, kind: ToastKind, message: impl Into<String>, duration: Duration) -> u64 {
        self.with_queue(|queue| {
            queue.next_id += 1;
            let id = queue.next_id;
            queue.toasts.push_back(Toast {
                id,
                kind,
                message: message.into(),
                duration,
                created_at: Instant::now(),
            });
            id
        })
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message, DEFAULT_TOAST_DURATION)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message, DEFAULT_TOAST_DURATION)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message, DEFAULT_TOAST_DURATION)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, message, DEFAULT_TOAST_DURATION)
    }

    /// Show the user-facing text of an error
    pub fn report(&self, err: &Error) -> u64 {
        match err {
            Error::RateLimited { .. } => self.warning(err.user_message()),
            _ => self.error(err.user_message()),
        }
    }

    pub fn dismiss(&self, id: u64) {
        self.with_queue(|queue| queue.toasts.retain(|t| t.id != id));
    }

    /// Visible toasts, oldest first; expired ones are dropped
    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    pub fn active_at(&self, now: Instant) -> Vec<Toast> {
        self.with_queue(|queue| {
            queue.toasts.retain(|t| !t.is_expired_at(now));
            queue.toasts.iter().cloned().collect()
        })
    }

    /// Remove and return every queued toast, expired or not
    pub fn drain(&self) -> Vec<Toast> {
        self.with_queue(|queue| queue.toasts.drain(..).collect())
    }
}
