//! Report types describing what a migration run did.
//!
//! A [`DocumentReport`] is produced per Markdown file and a [`BatchReport`]
//! aggregates them. Both serialize with `serde` so the CLI can emit JSON
//! for scripting (`--json`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentOutcome {
    /// References were found, every one migrated, and the file rewritten.
    Migrated,
    /// References were found but some could not be mapped to a new URL;
    /// the mapped prefix was rewritten and the rest left untouched.
    PartiallyMigrated,
    /// No recognized references — the file was not touched.
    Skipped,
}

/// Per-document result of a migration pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// The Markdown file this report describes.
    pub path: PathBuf,
    pub outcome: DocumentOutcome,
    /// References discovered by the extractor (after scheme filtering).
    pub references_found: usize,
    /// Assets actually downloaded this run (staged files may be reused).
    pub fetched: usize,
    /// Assets resolved to a new URL, whether freshly uploaded or
    /// deduplicated against existing remote content.
    pub uploaded: usize,
    /// Old literals replaced in the rewritten document.
    pub replaced: usize,
    /// One entry per reference left untouched (e.g. no new URL was
    /// available for it). Never silently dropped.
    pub warnings: Vec<String>,
}

impl DocumentReport {
    /// A report for a document with no recognized references.
    pub fn skipped(path: PathBuf) -> Self {
        Self {
            path,
            outcome: DocumentOutcome::Skipped,
            references_found: 0,
            fetched: 0,
            uploaded: 0,
            replaced: 0,
            warnings: Vec::new(),
        }
    }
}

/// Aggregate result of a batch run over many documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Reports for documents that completed (including skips and partial
    /// migrations), in processing order.
    pub documents: Vec<DocumentReport>,
    /// Documents that failed outright, with the rendered error message.
    pub failures: Vec<(PathBuf, String)>,
    /// Wall-clock duration of the whole batch in milliseconds.
    pub total_duration_ms: u64,
}

impl BatchReport {
    pub fn migrated_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome == DocumentOutcome::Migrated)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome == DocumentOutcome::Skipped)
            .count()
    }
}
