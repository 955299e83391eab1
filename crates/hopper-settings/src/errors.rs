//! Settings and channel error types.

use thiserror::Error;

/// Errors raised while loading settings or persisting the property channel.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing a file failed.
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// A settings or channel file held malformed JSON.
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A value was structurally valid JSON but unusable.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
