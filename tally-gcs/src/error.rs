//! Error types for tally-gcs.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from listing the destination bucket.
#[derive(Debug, Error)]
pub enum GcsError {
    /// The destination URL did not name a bucket and a non-empty prefix.
    #[error("invalid destination path '{url}': {reason}")]
    InvalidPath { url: String, reason: String },

    /// Credentials could not be loaded or refreshed.
    #[error("auth error: {0}")]
    Auth(String),

    /// The storage API call itself failed (transport error or non-success
    /// status).
    #[error("storage API request failed: {source}")]
    Api {
        #[source]
        source: Box<ureq::Error>,
    },

    /// The storage API answered with a body that did not decode.
    #[error("malformed storage API response: {source}")]
    Decode {
        #[source]
        source: std::io::Error,
    },

    /// The listing succeeded but returned zero objects. The destination
    /// prefix is almost certainly wrong, so this fails loudly instead of
    /// reporting everything as missing.
    #[error("no objects found under '{location}'")]
    EmptyListing { location: String },

    /// I/O failure on a credential file, with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credential file JSON encode/decode failure.
    #[error("credential JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`GcsError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GcsError {
    GcsError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`GcsError::Api`].
pub(crate) fn api_err(source: ureq::Error) -> GcsError {
    GcsError::Api {
        source: Box::new(source),
    }
}
