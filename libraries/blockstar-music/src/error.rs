//! Error types for music playback

use crate::types::TrackCategory;
use thiserror::Error;

/// Music manager errors
///
/// Every public operation validates its own preconditions and fails
/// immediately. Callers are expected to treat these as programming errors.
#[derive(Debug, Error)]
pub enum MusicError {
    /// Malformed input: unavailable host, out-of-range percent, unknown category
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation requires a prior `initialize`
    #[error("Music manager has to be initialized before use")]
    NotInitialized,

    /// Operation requires a prior `play`
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Explicit track index is past the end of the category
    #[error("Track index {index} out of range for {category} ({count} tracks)")]
    IndexOutOfRange {
        /// Category the index was looked up in
        category: TrackCategory,
        /// Requested index
        index: usize,
        /// Number of tracks registered for the category
        count: usize,
    },

    /// Host audio service reported a failure
    #[error("Host audio error: {0}")]
    Host(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MusicError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}

impl From<config::ConfigError> for MusicError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for music operations
pub type Result<T> = std::result::Result<T, MusicError>;
