//! Error types for the video settings menu.

use settings_graph_engine::SettingsError;
use thiserror::Error;

/// Result type alias for video menu operations.
pub type VideoResult<T> = Result<T, VideoError>;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A setting has no entry in the accessor table.
    #[error("no accessor registered for setting `{name}`")]
    MissingAccessor { name: String },

    #[error(
        "unknown platform profile `{name}` \
         (expected one of desktop, console, mobile or a .json file)"
    )]
    UnknownProfile { name: String },

    #[error("failed to parse platform profile: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
