//! Error types for the mdimg-migrate library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MigrateError`] — **Fatal**: no document can be processed at all
//!   (missing credentials, staging directory cannot be created, invalid
//!   configuration). Returned as `Err(MigrateError)` from the top-level
//!   batch entry points.
//!
//! * [`DocError`] — **Non-fatal**: one document failed (an asset would not
//!   download, the backend rejected an upload, the Markdown file could not
//!   be rewritten) but every other document in the batch is unaffected.
//!   The batch loop logs the diagnostic and moves on.
//!
//! "No image references found" is neither: it is an ordinary outcome,
//! reported as [`crate::output::DocumentOutcome::Skipped`].
//!
//! All messages carry the URL or file path plus the underlying cause so an
//! operator can retry a failed item by hand.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort the whole run.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Credentials/token-cache file was not found at the given path.
    #[error("Credentials file not found: '{path}'\nCheck the path exists and is readable.")]
    CredentialsNotFound { path: PathBuf },

    /// The credentials file exists but does not contain a usable token.
    #[error("Credentials file '{path}' is not usable: {detail}\nExpected JSON with an \"access_token\" (or \"token\") field.")]
    CredentialsInvalid { path: PathBuf, detail: String },

    /// The local staging directory could not be created.
    #[error("Failed to create staging directory '{path}': {source}")]
    StagingDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory given with `--dir` could not be walked.
    #[error("Failed to scan directory '{path}' for Markdown files: {source}")]
    DirScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error scoped to a single document.
///
/// The batch loop in [`crate::migrate::migrate_batch`] catches these,
/// records the failure in the [`crate::output::BatchReport`], and continues
/// with the next document.
#[derive(Debug, Error)]
pub enum DocError {
    /// The Markdown file itself could not be read.
    #[error("Failed to read Markdown file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network fault while fetching one asset URL.
    #[error("Failed to download '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// The asset host answered with a non-success status.
    #[error("Failed to download '{url}': HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    /// The staged asset bytes could not be written to disk.
    #[error("Failed to stage '{url}' at '{path}': {source}")]
    Stage {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote backend rejected or failed an upload.
    #[error("Failed to upload '{path}': {detail}")]
    Upload { path: PathBuf, detail: String },

    /// A backend API call failed (transport fault or error status).
    #[error("Backend call {endpoint} failed: {detail}")]
    Backend { endpoint: String, detail: String },

    /// The backend reported success but the response body did not contain
    /// the identifiers we need to build the new URL.
    #[error("Unexpected response from {endpoint}: {detail}")]
    UnexpectedResponse { endpoint: String, detail: String },

    /// Read/write failure while rewriting the Markdown file.
    #[error("Failed to rewrite Markdown file '{path}': {source}")]
    Rewrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_status_display_names_url_and_status() {
        let e = DocError::FetchStatus {
            url: "https://i.imgur.com/abc.png".into(),
            status: 404,
        };
        let msg = e.to_string();
        assert!(msg.contains("https://i.imgur.com/abc.png"));
        assert!(msg.contains("404"), "got: {msg}");
    }

    #[test]
    fn unexpected_response_display() {
        let e = DocError::UnexpectedResponse {
            endpoint: "mediaItems:batchCreate".into(),
            detail: "missing mediaItem.id".into(),
        };
        assert!(e.to_string().contains("batchCreate"));
        assert!(e.to_string().contains("missing mediaItem.id"));
    }

    #[test]
    fn credentials_invalid_display_hints_at_expected_shape() {
        let e = MigrateError::CredentialsInvalid {
            path: PathBuf::from("creds.json"),
            detail: "not JSON".into(),
        };
        assert!(e.to_string().contains("access_token"));
    }
}
