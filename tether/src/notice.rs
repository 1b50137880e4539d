//! User-facing notices, the fading messages of the rendered page.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Severity of a notice. Mirrors the message types the server emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    #[default]
    Info,
    Ok,
    Success,
    Warning,
    Error,
}

/// One fading message. The message is usually a translation key the
/// host resolves before display. Serializes with the same level names
/// the server uses, so a host can pass notices through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    /// How long the host should keep it on screen.
    pub duration: Duration,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
            duration: Duration::from_secs(3),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Ok,
            duration: Duration::from_secs(3),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
            duration: Duration::from_secs(3),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Warning,
            duration: Duration::from_secs(5),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
            duration: Duration::from_secs(5),
        }
    }
}

/// Notices waiting for the host to show them.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    items: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        self.items.push_back(notice);
    }

    /// Drain everything queued, oldest first.
    pub fn take_all(&mut self) -> Vec<Notice> {
        self.items.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
