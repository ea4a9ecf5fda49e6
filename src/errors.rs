/*!
 * Error types for the dataset-translator application.
 *
 * This module contains custom error types for the different stages of a
 * translation job, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while translating a single field value
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered but the answer held no text
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// The provider answered with something we could not use
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Errors that can occur while fetching the source dataset
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The HTTP request could not be completed
    #[error("Failed to download dataset from {url}: {message}")]
    Request {
        /// Source URL
        url: String,
        /// Underlying failure
        message: String,
    },

    /// The server answered with a non-success status
    #[error("Dataset download from {url} failed with status {status_code}")]
    Status {
        /// Source URL
        url: String,
        /// HTTP status code
        status_code: u16,
    },

    /// The downloaded body could not be written to disk
    #[error("Failed to write dataset to {path:?}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while writing or reading checkpoint and combined files
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// A filesystem operation failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialized
    #[error("Failed to serialize records for {path:?}: {source}")]
    Serialize {
        /// Destination path
        path: PathBuf,
        /// Underlying serde failure
        #[source]
        source: serde_json::Error,
    },

    /// An existing checkpoint file could not be parsed
    #[error("Failed to parse checkpoint {path:?}: {source}")]
    Parse {
        /// Checkpoint path
        path: PathBuf,
        /// Underlying serde failure
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source dataset could not be read
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// The source dataset could not be fetched
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error writing or reading job output
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A chunk could not be translated, so it was not persisted
    #[error("Chunk [{start}, {end}) failed ({failed} record(s)): {source}")]
    Chunk {
        /// First index of the chunk
        start: usize,
        /// One past the last index of the chunk
        end: usize,
        /// Number of records whose translation failed
        failed: usize,
        /// First failure observed
        #[source]
        source: TranslationError,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
