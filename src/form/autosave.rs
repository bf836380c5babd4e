//! Autosave scheduling
//!
//! Input events are debounced: each one restarts a quiet-period timer and
//! the commit happens once the timer runs out. A change event (blur after
//! an edit, discrete selection) commits at once and cancels the timer, so
//! at most one commit happens per burst of edits.

use crate::consts::{AUTOSAVE_DELAY_MS, SAVED_DISPLAY_MS};
use crate::platform::time::Millis;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    /// Nothing to save
    Idle,
    /// Waiting for the quiet period to end
    Pending { deadline: Millis },
    /// A commit is in progress
    Committing,
}

/// What caused a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    /// Quiet period elapsed after the last input
    Debounce,
    /// Change event, committed immediately
    Change,
}

/// Indicator shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    /// Indicator text, `None` when hidden
    pub fn label(&self) -> Option<&'static str> {
        match self {
            SaveStatus::Idle => None,
            SaveStatus::Saving => Some("💾 Sauvegarde..."),
            SaveStatus::Saved => Some("✓ Sauvegardé"),
            SaveStatus::Error => Some("⚠ Échec de la sauvegarde"),
        }
    }

    /// CSS class of the indicator state
    pub fn css_class(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error => "error",
        }
    }
}

/// Debounce timer plus status indicator
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    delay: Millis,
    status_display: Millis,
    state: AutosaveState,
    status: SaveStatus,
    /// When the saved/error indicator hides
    status_until: Option<Millis>,
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(AUTOSAVE_DELAY_MS, SAVED_DISPLAY_MS)
    }
}

impl AutosaveScheduler {
    pub fn new(delay: Millis, status_display: Millis) -> Self {
        Self {
            delay,
            status_display,
            state: AutosaveState::Idle,
            status: SaveStatus::Idle,
            status_until: None,
        }
    }

    pub fn state(&self) -> AutosaveState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AutosaveState::Pending { .. })
    }

    /// Input event: (re)start the quiet period
    pub fn on_input(&mut self, now: Millis) {
        self.state = AutosaveState::Pending {
            deadline: now + self.delay,
        };
        self.status = SaveStatus::Saving;
        self.status_until = None;
    }

    /// Change event: cancel any pending timer and commit now
    pub fn on_change(&mut self, _now: Millis) -> CommitTrigger {
        if let AutosaveState::Pending { deadline } = self.state {
            log::debug!("Change event cancels autosave due at {}", deadline);
        }
        self.state = AutosaveState::Committing;
        CommitTrigger::Change
    }

    /// Manual save: drop the pending timer, the caller commits itself
    pub fn cancel(&mut self) {
        if self.is_pending() {
            self.state = AutosaveState::Idle;
            self.status = SaveStatus::Idle;
        }
    }

    /// Fire due timers. Returns a trigger when a debounced commit is due.
    pub fn poll(&mut self, now: Millis) -> Option<CommitTrigger> {
        if self.status_until.is_some_and(|until| now >= until) {
            self.status = SaveStatus::Idle;
            self.status_until = None;
        }

        match self.state {
            AutosaveState::Pending { deadline } if now >= deadline => {
                self.state = AutosaveState::Committing;
                Some(CommitTrigger::Debounce)
            }
            _ => None,
        }
    }

    /// Commit finished: back to idle, show the outcome for a while
    pub fn finish(&mut self, succeeded: bool, now: Millis) {
        self.state = AutosaveState::Idle;
        self.status = if succeeded {
            SaveStatus::Saved
        } else {
            SaveStatus::Error
        };
        self.status_until = Some(now + self.status_display);
    }

    /// Indicator state at `now`
    pub fn status(&self, now: Millis) -> SaveStatus {
        match self.status_until {
            Some(until) if now >= until => SaveStatus::Idle,
            _ => self.status,
        }
    }

    /// Earliest time `poll` has work to do
    pub fn next_deadline(&self) -> Option<Millis> {
        let pending = match self.state {
            AutosaveState::Pending { deadline } => Some(deadline),
            _ => None,
        };
        match (pending, self.status_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
