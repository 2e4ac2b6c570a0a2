//! Notification service - transient success/error messages
//!
//! Timing lives outside this module: the App schedules expiry and removal
//! timers and calls back into [`NotificationCenter`] when they fire.

use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationPhase {
    Visible,
    /// Exit animation running, removal pending
    Leaving,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub phase: NotificationPhase,
}

/// Stack of live notifications in insertion order
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: u64,
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.items.push(Notification {
            id,
            message: message.into(),
            kind,
            created_at: Utc::now(),
            phase: NotificationPhase::Visible,
        });
        id
    }

    /// Move a visible notification to `Leaving`. False if it is already
    /// leaving or gone.
    pub fn begin_exit(&mut self, id: NotificationId) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if n.phase == NotificationPhase::Visible => {
                n.phase = NotificationPhase::Leaving;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Most recent notification that is still fully visible
    pub fn newest_visible(&self) -> Option<NotificationId> {
        self.items
            .iter()
            .rev()
            .find(|n| n.phase == NotificationPhase::Visible)
            .map(|n| n.id)
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
