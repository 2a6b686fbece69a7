//! Error types for chukka-core

use thiserror::Error;

/// Result type alias using chukka-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chukka-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failed before a response was received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Response decoding error: {0}")]
    Decoding(String),

    /// Base URL rejected at client construction
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Secret storage error
    #[error("Secret storage error: {0}")]
    SecretStorage(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required related record has no remote id yet
    #[error("Unsynced relation: {0}")]
    UnsyncedRelation(String),

    /// Attempt to change a remote id that is already set
    #[error("Remote id conflict: {0}")]
    RemoteIdConflict(String),
}
