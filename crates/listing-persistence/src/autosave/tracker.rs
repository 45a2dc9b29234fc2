//! Save status tracking for auto-save.

use std::fmt;

use chrono::{DateTime, Utc};

/// Externally visible state of draft persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    /// Label for a status indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Saving => "Saving draft...",
            Self::Saved => "Draft saved",
            Self::Error => "Could not save draft",
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Tracks the save status and unsaved edits of a draft.
///
/// Every transition bumps a generation counter. A delayed revert to
/// [`SaveStatus::Idle`] only applies if no transition happened since the
/// status it was scheduled for.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    status: SaveStatus,
    generation: u64,

    /// Sequence number of the most recent edit.
    edit_seq: u64,

    /// Highest edit sequence known to be stored remotely.
    saved_seq: u64,

    saves_in_flight: u32,
    last_saved: Option<DateTime<Utc>>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self {
            status: SaveStatus::Idle,
            generation: 0,
            edit_seq: 0,
            saved_seq: 0,
            saves_in_flight: 0,
            last_saved: None,
        }
    }

    #[inline]
    pub fn status(&self) -> SaveStatus {
        self.status
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if there are edits not yet stored remotely.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.edit_seq > self.saved_seq
    }

    /// Check if a save is in progress.
    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saves_in_flight > 0
    }

    /// When the last successful save completed.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Record an edit. The status becomes idle.
    pub fn mark_dirty(&mut self) -> u64 {
        self.edit_seq += 1;
        self.transition(SaveStatus::Idle);
        self.edit_seq
    }

    /// Mark that a save has started.
    ///
    /// Returns the edit sequence the save covers.
    pub fn start_save(&mut self) -> u64 {
        self.saves_in_flight += 1;
        self.transition(SaveStatus::Saving);
        self.edit_seq
    }

    /// Mark that a save covering `covered` edits has completed successfully.
    ///
    /// Returns the generation of the resulting `saved` status.
    pub fn save_complete(&mut self, covered: u64) -> u64 {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        self.saved_seq = self.saved_seq.max(covered);
        self.last_saved = Some(Utc::now());
        self.transition(SaveStatus::Saved)
    }

    /// Mark that a save has failed. Unsaved edits stay dirty.
    ///
    /// Returns the generation of the resulting `error` status.
    pub fn save_failed(&mut self) -> u64 {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        self.transition(SaveStatus::Error)
    }

    /// Forget a save whose draft was discarded or published meanwhile.
    pub fn abandon_save(&mut self) {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
    }

    /// Revert a `saved` or `error` status to idle, unless a newer
    /// transition happened after `generation`.
    pub fn revert(&mut self, generation: u64) -> bool {
        let displayed = matches!(self.status, SaveStatus::Saved | SaveStatus::Error);
        if displayed && self.generation == generation {
            self.transition(SaveStatus::Idle);
            true
        } else {
            false
        }
    }

    /// Forget all edits, e.g. after the draft was published or discarded.
    pub fn reset(&mut self) {
        self.edit_seq = 0;
        self.saved_seq = 0;
        self.last_saved = None;
        self.transition(SaveStatus::Idle);
    }

    fn transition(&mut self, status: SaveStatus) -> u64 {
        self.status = status;
        self.generation += 1;
        self.generation
    }
}
