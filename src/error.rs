//! Application-wide error types.
//!
//! Library modules return [`Result`] with the [`Error`] enum below, while
//! the CLI and `main` use `anyhow` for convenient error propagation.
//!
//! Most failures in a batch run are per-file: operations report them through
//! the console and keep going. The variants here are what escapes an
//! operation as a whole (bad pattern, bad image, nothing to work on).

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tag reading/writing error reported by the tag store
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// Regular expression failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Tag name outside the supported vocabulary
    #[error("Unknown tag '{0}' (expected one of: artist, album, genre, tracknumber, title)")]
    UnknownTag(String),

    /// Image rejected before any file was touched
    #[error("Invalid image {path}: {reason}")]
    InvalidImage { path: PathBuf, reason: String },

    /// Discovery produced nothing to work on
    #[error("No readable audio files found")]
    EmptyCollection,

    /// File could not be moved to its new location
    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Interactive prompt failed (closed terminal, broken pipe)
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid image error.
    pub fn invalid_image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a prompt error.
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt(message.into())
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}
