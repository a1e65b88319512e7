//! Storage backends: where migrated assets end up.
//!
//! The pipeline is parameterized by a single [`Uploader`] trait so the same
//! extract/name/fetch/rewrite code serves both destinations. A backend
//! implements three capabilities:
//!
//! 1. **create-or-find container** — resolve a folder/album by exact name,
//!    creating it on first use
//! 2. **upload asset** — push one staged file, returning a durable URL
//! 3. **dedupe by hash** (optional) — report an already-present identical
//!    asset so it is not uploaded twice; backends without checksum metadata
//!    keep the default no-op
//!
//! The trait is object-safe (`&dyn Uploader`) so callers pick the backend
//! at runtime from a CLI flag, and tests inject a mock.

pub mod auth;
pub mod drive;
pub mod photos;

pub use drive::DriveFolderUploader;
pub use photos::PhotosAlbumUploader;

use crate::error::DocError;
use async_trait::async_trait;
use std::path::Path;

/// A resolved destination container (Drive folder or Photos album).
///
/// Constructed once per document by [`Uploader::resolve_container`] and
/// passed by reference into every subsequent call; there is no ambient
/// session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadContext {
    /// Exact container name that was looked up or created.
    pub name: String,
    /// Backend-assigned container identifier.
    pub id: String,
}

/// A remote storage destination for migrated assets.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Look up the container by exact name, creating it if absent.
    async fn resolve_container(&self, name: &str) -> Result<UploadContext, DocError>;

    /// Return the URL of an already-present asset identical to the staged
    /// file, if the backend can tell. Called before every upload; the
    /// default says "no duplicate found".
    async fn find_existing(
        &self,
        _ctx: &UploadContext,
        _local: &Path,
    ) -> Result<Option<String>, DocError> {
        Ok(None)
    }

    /// Upload one staged file into the container, returning a durable,
    /// retrievable URL for it.
    async fn upload(&self, ctx: &UploadContext, local: &Path) -> Result<String, DocError>;
}
