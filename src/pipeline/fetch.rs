//! Asset fetching: download a source URL to its staged local path.
//!
//! The fetcher writes the response body to the destination only on an
//! HTTP-success status; anything else yields a [`DocError`] carrying the
//! URL and cause, so the document-level loop can abort just that document.

use crate::error::{DocError, MigrateError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Build the HTTP client used for asset downloads.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, MigrateError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MigrateError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Download `url` and write the full body to `dest`.
///
/// `dest` is written only on success; a failed request leaves no file
/// behind.
pub async fn fetch_to_path(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), DocError> {
    debug!("Fetching {url}");

    let response = client.get(url).send().await.map_err(|e| DocError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(DocError::FetchStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| DocError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|source| DocError::Stage {
            url: url.to_string(),
            path: dest.to_path_buf(),
            source,
        })?;

    info!("Downloaded {url} → {}", dest.display());
    Ok(())
}
