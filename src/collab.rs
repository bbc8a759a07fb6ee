//! Collaborators the scanner talks to but does not own.
//!
//! The scanner never touches product data: it hands a path to a [`Navigator`]
//! and reports problems through a [`Notifier`]. Both calls are fire-and-forget.

use std::sync::{Arc, Mutex, MutexGuard};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Nothing went wrong, e.g. an upload without a code
    Info,
    /// Something the user should act on
    Error,
}

/// One toast-style message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub kind: NoticeKind,
    /// Short headline
    pub title: String,
    /// One-sentence explanation
    pub message: String,
}

impl Notice {
    /// Informational notice
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notice
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Route changes
pub trait Navigator {
    /// Go to `path`; returns immediately
    fn navigate(&mut self, path: &str);
}

/// User notifications
pub trait Notifier {
    /// Show `notice` to the user
    fn notify(&mut self, notice: Notice);
}

impl<F: FnMut(&str)> Navigator for F {
    fn navigate(&mut self, path: &str) {
        self(path)
    }
}

/// Writes notices to the log; for hosts without a UI surface
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => tracing::info!(title = %notice.title, "{}", notice.message),
            NoticeKind::Error => tracing::warn!(title = %notice.title, "{}", notice.message),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Navigator that remembers every path; clones share the record
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    paths: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path navigated to, oldest first
    pub fn paths(&self) -> Vec<String> {
        lock(&self.paths).clone()
    }

    /// Most recent path
    pub fn last(&self) -> Option<String> {
        lock(&self.paths).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str) {
        tracing::info!(path, "navigating");
        lock(&self.paths).push(path.to_string());
    }
}

/// Notifier that remembers every notice; clones share the record
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice shown, oldest first
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    /// Titles of every notice shown
    pub fn titles(&self) -> Vec<String> {
        lock(&self.notices).iter().map(|n| n.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}
