//! Bounded value history for settings.
//!
//! Every committed value is recorded together with the reason it changed:
//! ```text
//! ValueHistory = {
//!     entries: Vec<ValueChange>,   // oldest first, bounded by window
//!     next_sequence: u64,
//! }
//! ```

use serde::{Deserialize, Serialize};
use settings_graph_core::SettingValue;

/// Why a setting's value changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// Set directly by the user or the caller.
    Change,
    /// Picked up from the store after another setting or an action wrote it.
    DependencyChanged,
    ResetToDefault,
    RestoreToInitial,
}

impl ChangeReason {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeReason::Change => "change",
            ChangeReason::DependencyChanged => "dependency_changed",
            ChangeReason::ResetToDefault => "reset_to_default",
            ChangeReason::RestoreToInitial => "restore_to_initial",
        }
    }
}

/// One recorded value change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub value: Option<SettingValue>,
    pub reason: ChangeReason,
    /// Monotonically increasing per setting.
    pub sequence: u64,
}

/// History of value changes, trimmed to a fixed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueHistory {
    entries: Vec<ValueChange>,
    window: usize,
    next_sequence: u64,
}

impl Default for ValueHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

impl ValueHistory {
    /// Default history window size.
    pub const DEFAULT_WINDOW: usize = 16;

    pub fn new(window: usize) -> Self {
        Self {
            entries: Vec::new(),
            window: window.max(1),
            next_sequence: 1,
        }
    }

    /// Record a change, trimming the oldest entries past the window.
    pub fn record(&mut self, value: Option<SettingValue>, reason: ChangeReason) {
        self.entries.push(ValueChange {
            value,
            reason,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;

        if self.entries.len() > self.window {
            let overflow = self.entries.len() - self.window;
            self.entries.drain(0..overflow);
        }
    }

    pub fn entries(&self) -> &[ValueChange] {
        &self.entries
    }

    /// Last `n` changes, oldest first.
    pub fn recent(&self, n: usize) -> &[ValueChange] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&ValueChange> {
        self.entries.last()
    }

    /// Total number of changes ever recorded, including trimmed ones.
    pub fn change_count(&self) -> u64 {
        self.next_sequence - 1
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        if self.entries.len() > self.window {
            let overflow = self.entries.len() - self.window;
            self.entries.drain(0..overflow);
        }
    }

    /// Changes recorded for a given reason.
    pub fn by_reason(&self, reason: ChangeReason) -> Vec<&ValueChange> {
        self.entries.iter().filter(|c| c.reason == reason).collect()
    }
}
