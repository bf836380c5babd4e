//! Transient notifications
//!
//! One slot: a new notification replaces whatever is showing. Each one is
//! inserted hidden, fades in shortly after, stays up for a fixed time, then
//! fades out and is removed.

use crate::consts::{NOTIFICATION_DISPLAY_MS, NOTIFICATION_SHOW_DELAY_MS, NOTIFICATION_TEARDOWN_MS};
use crate::platform::time::Millis;

/// Success or failure styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "⚠",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// Lifecycle stage, derived from time since insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPhase {
    /// In the page, not yet visible
    Inserted,
    /// Fully shown
    Visible,
    /// Fading out
    Leaving,
    /// Gone
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Increases with every notification, so a view can tell them apart
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub inserted_at: Millis,
}

/// Phase timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTiming {
    pub show_delay: Millis,
    pub display: Millis,
    pub teardown: Millis,
}

impl Default for NotificationTiming {
    fn default() -> Self {
        Self {
            show_delay: NOTIFICATION_SHOW_DELAY_MS,
            display: NOTIFICATION_DISPLAY_MS,
            teardown: NOTIFICATION_TEARDOWN_MS,
        }
    }
}

/// Single-slot notifier
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    timing: NotificationTiming,
    current: Option<Notification>,
    next_id: u64,
}

impl Notifier {
    pub fn new(timing: NotificationTiming) -> Self {
        Self {
            timing,
            current: None,
            next_id: 0,
        }
    }

    /// Show a notification, replacing the current one
    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind, now: Millis) -> u64 {
        let message = message.into();
        match kind {
            NotificationKind::Success => log::info!("{}", message),
            NotificationKind::Error => log::warn!("{}", message),
        }

        self.next_id += 1;
        self.current = Some(Notification {
            id: self.next_id,
            message,
            kind,
            inserted_at: now,
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>, now: Millis) -> u64 {
        self.notify(message, NotificationKind::Success, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: Millis) -> u64 {
        self.notify(message, NotificationKind::Error, now)
    }

    /// Notification still in the page at `now`
    pub fn current(&self, now: Millis) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| self.phase_of(n, now) != NotificationPhase::Removed)
    }

    /// Phase of the current notification (`Removed` when there is none)
    pub fn phase(&self, now: Millis) -> NotificationPhase {
        self.current
            .as_ref()
            .map(|n| self.phase_of(n, now))
            .unwrap_or(NotificationPhase::Removed)
    }

    fn phase_of(&self, n: &Notification, now: Millis) -> NotificationPhase {
        let elapsed = now.saturating_sub(n.inserted_at);
        let t = &self.timing;
        if elapsed < t.show_delay {
            NotificationPhase::Inserted
        } else if elapsed < t.display {
            NotificationPhase::Visible
        } else if elapsed < t.display + t.teardown {
            NotificationPhase::Leaving
        } else {
            NotificationPhase::Removed
        }
    }

    /// Drop a notification whose lifetime has ended
    pub fn poll(&mut self, now: Millis) {
        if self.phase(now) == NotificationPhase::Removed {
            self.current = None;
        }
    }

    /// Next phase change of the current notification
    pub fn next_deadline(&self, now: Millis) -> Option<Millis> {
        let n = self.current.as_ref()?;
        let t = &self.timing;
        [t.show_delay, t.display, t.display + t.teardown]
            .into_iter()
            .map(|offset| n.inserted_at + offset)
            .find(|&at| at > now)
    }
}
