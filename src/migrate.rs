//! Migration entry points: per-document pipeline and batch loop.
//!
//! ## Failure policy
//!
//! A failed fetch or upload aborts only the document it belongs to; the
//! batch loop records the diagnostic and moves to the next file. Nothing
//! about one document's processing is visible to another except the shared
//! staging directory, and access to it is strictly sequential.
//!
//! The staging directory is deliberately left in place after a run: a
//! restarted run skips re-fetching any asset whose staged file already
//! exists (coarse idempotence; a partially written file is also skipped,
//! which is an accepted limitation).

use crate::backend::Uploader;
use crate::config::MigrationConfig;
use crate::error::{DocError, MigrateError};
use crate::output::{BatchReport, DocumentOutcome, DocumentReport};
use crate::pipeline::{extract, fetch, name, rewrite};
use crate::reference::ReplacementMapping;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Create the staging directory if it does not exist yet.
///
/// Called by [`migrate_batch`] and the CLI before any document is touched;
/// a failure here is fatal since no asset could be staged.
pub fn ensure_staging_dir(config: &MigrationConfig) -> Result<(), MigrateError> {
    std::fs::create_dir_all(&config.staging_dir).map_err(|source| MigrateError::StagingDirFailed {
        path: config.staging_dir.clone(),
        source,
    })
}

/// Recursively collect `*.md` files under `dir`, sorted for a stable
/// processing order.
pub fn collect_markdown_files(dir: &Path) -> Result<Vec<PathBuf>, MigrateError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| MigrateError::DirScanFailed {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "md")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Migrate the images of one Markdown document.
///
/// Runs the full pipeline: extract → name → fetch → upload → rewrite.
/// Returns a [`DocumentReport`] describing what happened; a document with
/// no recognized references reports [`DocumentOutcome::Skipped`] and is not
/// touched.
///
/// The caller is expected to have created `config.staging_dir` (see
/// [`ensure_staging_dir`]) and to reuse one `client` across documents so
/// the whole batch shares a connection pool (see
/// [`fetch::build_client`]); [`migrate_batch`] and the CLI do both.
pub async fn migrate_document(
    path: &Path,
    uploader: &dyn Uploader,
    client: &reqwest::Client,
    config: &MigrationConfig,
) -> Result<DocumentReport, DocError> {
    info!("Processing {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| DocError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc_stem = doc_stem(path);

    // ── Step 1: Extract references ───────────────────────────────────────
    let mut references = extract::extract_references(&text, &doc_stem, config);
    if references.is_empty() {
        info!("No image references found in {}; skipping", path.display());
        return Ok(DocumentReport::skipped(path.to_path_buf()));
    }
    info!("Found {} image reference(s)", references.len());

    // ── Step 2: Assign local names ───────────────────────────────────────
    name::assign_local_names(&mut references, &doc_stem);

    // ── Step 3: Fetch assets to the staging directory ────────────────────
    let mut fetched = 0usize;
    for reference in &references {
        let dest = config.staging_dir.join(&reference.local_name);
        if config.skip_staged && dest.exists() {
            debug!("Already staged: {}", dest.display());
            continue;
        }
        fetch::fetch_to_path(client, &reference.source_url, &dest).await?;
        fetched += 1;
    }

    // ── Step 4: Resolve the destination container ────────────────────────
    let container_name = config.container_name.clone().unwrap_or_else(|| doc_stem.clone());
    let ctx = uploader.resolve_container(&container_name).await?;
    info!("Using container '{}' ({})", ctx.name, ctx.id);

    // ── Step 5: Upload, deduplicating where the backend can ──────────────
    let mut mapping = ReplacementMapping::new();
    for reference in &references {
        let local = config.staging_dir.join(&reference.local_name);
        let new_url = match uploader.find_existing(&ctx, &local).await? {
            Some(url) => {
                info!("Reusing existing remote asset for '{}'", reference.local_name);
                url
            }
            None => uploader.upload(&ctx, &local).await?,
        };
        mapping.push(reference.old_literal.clone(), new_url);
    }
    let uploaded = mapping.len();

    // ── Step 6: Rewrite the document ─────────────────────────────────────
    let outcome = rewrite::apply_replacements(&text, &references, &mapping);
    for warning in &outcome.warnings {
        warn!("{}: {warning}", path.display());
    }
    rewrite::write_back(path, &outcome.text)?;
    info!("Rewrote {} with {} new URL(s)", path.display(), outcome.replaced);

    Ok(DocumentReport {
        path: path.to_path_buf(),
        outcome: if outcome.warnings.is_empty() {
            DocumentOutcome::Migrated
        } else {
            DocumentOutcome::PartiallyMigrated
        },
        references_found: references.len(),
        fetched,
        uploaded,
        replaced: outcome.replaced,
        warnings: outcome.warnings,
    })
}

/// Migrate a batch of Markdown documents, strictly sequentially.
///
/// A [`DocError`] aborts only the document it occurred in; the batch
/// continues and the failure is recorded in the report.
pub async fn migrate_batch(
    paths: &[PathBuf],
    uploader: &dyn Uploader,
    config: &MigrationConfig,
) -> Result<BatchReport, MigrateError> {
    let start = Instant::now();
    ensure_staging_dir(config)?;
    // One client for the whole batch; every document shares its pool.
    let client = fetch::build_client(config.download_timeout_secs)?;

    let mut report = BatchReport::default();
    for path in paths {
        match migrate_document(path, uploader, &client, config).await {
            Ok(doc) => report.documents.push(doc),
            Err(e) => {
                warn!("Skipping {} after error: {e}", path.display());
                report.failures.push((path.clone(), e.to_string()));
            }
        }
    }

    report.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {} migrated, {} skipped, {} failed in {}ms",
        report.migrated_count(),
        report.skipped_count(),
        report.failures.len(),
        report.total_duration_ms
    );
    Ok(report)
}

/// File name without extension, used for container names, fallback
/// captions, and banner captions.
fn doc_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string())
}
