//! Error types for the settings engine.

use settings_graph_core::{OracleError, SettingId};
use thiserror::Error;

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Failure reported by an external store accessor or action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WriteError {
    pub message: String,
}

impl WriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur while building or mutating a settings tree.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The value lies outside the setting's declared domain. Nothing was changed.
    #[error("invalid value {value} for setting `{setting}`: {reason}")]
    InvalidValue {
        setting: String,
        value: String,
        reason: String,
    },

    /// Adding the dependency would close a cycle. The graph was left unchanged.
    #[error("dependency `{from}` -> `{to}` would create a cycle")]
    Cycle { from: String, to: String },

    /// A setting referenced by id does not exist.
    #[error("setting not found: {id}")]
    SettingNotFound { id: SettingId },

    /// A setting referenced by name does not exist.
    #[error("unknown setting: {name}")]
    UnknownName { name: String },

    /// Two settings were registered under the same dev name.
    #[error("duplicate setting name: {name}")]
    DuplicateName { name: String },

    /// A collection path does not exist (or its parent does not).
    #[error("collection not found: {path}")]
    CollectionNotFound { path: String },

    /// An external capability query could not be answered.
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    /// The external store rejected a write. Nothing was changed.
    #[error("failed to write setting `{setting}`: {source}")]
    AccessorWrite {
        setting: String,
        #[source]
        source: WriteError,
    },

    /// `run_action` was called on a setting without an action.
    #[error("setting `{setting}` is not an action")]
    NotAnAction { setting: String },
}

impl SettingsError {
    /// Whether the error is a construction-time configuration bug that should
    /// abort building the tree.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SettingsError::Cycle { .. }
                | SettingsError::DuplicateName { .. }
                | SettingsError::CollectionNotFound { .. }
        )
    }
}
