//! # mdimg-migrate
//!
//! Migrate the images of a Markdown blog to Google Drive or Google Photos
//! and rewrite the links in place.
//!
//! ## Why this crate?
//!
//! Blog posts accumulate image links on hosts that rot: imgur galleries,
//! Drive share links that need a browser session, CDN URLs from editors
//! long since abandoned. This tool moves every referenced asset to one
//! durable backend and rewrites the Markdown so the documents keep
//! rendering — without touching a single byte outside the URLs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! post.md
//!  │
//!  ├─ 1. Extract  ordered image references (4 dialects, fixed priority)
//!  ├─ 2. Name     sanitized, collision-free staging filenames
//!  ├─ 3. Fetch    download each asset to the staging directory
//!  ├─ 4. Upload   per-document Drive folder / Photos album, hash dedupe
//!  └─ 5. Rewrite  substitute old URLs with new ones, in discovery order
//! ```
//!
//! Everything runs strictly sequentially; the staging directory is left on
//! disk so a re-run skips already-downloaded assets.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdimg_migrate::{
//!     backend::{auth, DriveFolderUploader},
//!     migrate_batch, MigrationConfig,
//! };
//! use std::path::{Path, PathBuf};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = auth::load_access_token(Path::new("credentials.json"))?;
//!     let uploader = DriveFolderUploader::new(
//!         reqwest::Client::new(),
//!         token,
//!         "drive-parent-folder-id".into(),
//!     );
//!     let config = MigrationConfig::default();
//!     let paths = vec![PathBuf::from("content/posts/hello.md")];
//!     let report = migrate_batch(&paths, &uploader, &config).await?;
//!     eprintln!("{} migrated, {} failed", report.migrated_count(), report.failures.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdimg` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! mdimg-migrate = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod migrate;
pub mod output;
pub mod pipeline;
pub mod reference;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{UploadContext, Uploader};
pub use config::{DialectSet, MigrationConfig, MigrationConfigBuilder};
pub use error::{DocError, MigrateError};
pub use migrate::{collect_markdown_files, ensure_staging_dir, migrate_batch, migrate_document};
pub use output::{BatchReport, DocumentOutcome, DocumentReport};
pub use reference::{ImageReference, ReplacementMapping};
