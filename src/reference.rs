//! Typed records for discovered image references and URL replacements.
//!
//! The whole pipeline is built around an ordered `Vec<ImageReference>`:
//! extraction produces it, the namer fills in `local_name`, the fetcher and
//! uploader consume it one entry at a time, and the rewriter applies the
//! resulting [`ReplacementMapping`] in the same order. Nothing outside this
//! sequence carries state between stages.

use serde::{Deserialize, Serialize};

/// One discovered image mention in a Markdown document.
///
/// Invariants maintained by the pipeline:
///
/// * `old_literal` is never empty and occurs in the source document at
///   least once (it is the exact matched substring).
/// * `local_name` values are pairwise distinct within one document (the
///   namer appends a monotonically increasing discovery index).
/// * The `Vec<ImageReference>` order is discovery order — dialect priority
///   first, then left-to-right within each dialect — and is preserved
///   through fetching, uploading, and rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Human-readable label from the Markdown alt-text; may be empty.
    pub caption: String,

    /// The URL the asset is fetched from, after host-specific
    /// normalization (a Drive share link becomes a direct-content URL).
    pub source_url: String,

    /// The exact substring in the original document representing this
    /// reference's URL. Replaced verbatim by the rewriter, never re-derived.
    pub old_literal: String,

    /// Sanitized, unique filename assigned by the namer. Empty until
    /// [`crate::pipeline::name::assign_local_names`] runs.
    pub local_name: String,
}

impl ImageReference {
    /// A reference whose literal and fetch URL are the same matched text.
    pub fn direct(caption: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            caption: caption.into(),
            source_url: url.clone(),
            old_literal: url,
            local_name: String::new(),
        }
    }
}

/// Ordered `(old_literal, new_url)` pairs, index-aligned with the
/// reference sequence that produced them.
///
/// Built after upload, consumed exactly once by
/// [`crate::pipeline::rewrite::apply_replacements`]. A mapping may be
/// shorter than the reference sequence when uploads failed; the rewriter
/// replaces only the mapped prefix and warns about the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMapping {
    pairs: Vec<(String, String)>,
}

impl ReplacementMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair the next old literal with its new URL. Call in discovery order.
    pub fn push(&mut self, old_literal: impl Into<String>, new_url: impl Into<String>) {
        self.pairs.push((old_literal.into(), new_url.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate pairs in the order they were pushed.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(o, n)| (o.as_str(), n.as_str()))
    }
}

impl FromIterator<(String, String)> for ReplacementMapping {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
