//! Document rewriting: substitute old URL literals with new URLs.
//!
//! ## Substitution contract
//!
//! Replacements are applied sequentially in discovery order, and each one
//! replaces **all** occurrences of that literal in the current text state.
//! Apart from the substituted URLs, the rewritten document is byte-identical
//! to the original.
//!
//! Because each step is a whole-text substring replace rather than a
//! positioned edit, a literal that is a substring of a later, not-yet
//! processed literal gets mutated inside it first. That is a known sharp
//! edge of this substitution strategy; `prefix_collision_literal_is_mutated_early`
//! below pins the behaviour so any future change to an offset-based single
//! pass must be made deliberately, with that test updated.
//!
//! A mapping shorter than the reference sequence replaces only the mapped
//! prefix; every unmapped reference produces a warning, never a silent drop.

use crate::error::DocError;
use crate::reference::{ImageReference, ReplacementMapping};
use std::path::Path;
use tracing::debug;

/// Result of applying a [`ReplacementMapping`] to document text.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// The rewritten document text.
    pub text: String,
    /// Mapping entries whose literal occurred at least once. Re-applying an
    /// already-applied mapping yields 0 here (the literals are gone).
    pub replaced: usize,
    /// One message per reference left untouched.
    pub warnings: Vec<String>,
}

/// Apply the mapping to `text`, in mapping order.
///
/// `references` is the full discovery sequence the mapping was built from;
/// it is consulted only to warn about references beyond the mapping's end.
pub fn apply_replacements(
    text: &str,
    references: &[ImageReference],
    mapping: &ReplacementMapping,
) -> RewriteOutcome {
    let mut out = text.to_string();
    let mut replaced = 0usize;

    for (old_literal, new_url) in mapping.iter() {
        if out.contains(old_literal) {
            out = out.replace(old_literal, new_url);
            replaced += 1;
        } else {
            debug!("Literal already absent, nothing to replace: {old_literal}");
        }
    }

    let warnings: Vec<String> = references
        .iter()
        .skip(mapping.len())
        .map(|r| {
            format!(
                "No new URL for '{}' ({}); left untouched",
                r.old_literal, r.local_name
            )
        })
        .collect();

    RewriteOutcome {
        text: out,
        replaced,
        warnings,
    }
}

/// Overwrite the document file with the rewritten text.
///
/// Whole new content replaces whole old content; no atomic-write guarantee
/// beyond that.
pub fn write_back(path: &Path, text: &str) -> Result<(), DocError> {
    std::fs::write(path, text).map_err(|source| DocError::Rewrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ImageReference;

    fn refs_for(urls: &[&str]) -> Vec<ImageReference> {
        urls.iter()
            .enumerate()
            .map(|(i, u)| {
                let mut r = ImageReference::direct("", *u);
                r.local_name = format!("doc_{i}");
                r
            })
            .collect()
    }

    fn mapping_for(pairs: &[(&str, &str)]) -> ReplacementMapping {
        pairs
            .iter()
            .map(|(o, n)| (o.to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn full_mapping_round_trip() {
        let text = "![a](https://h/a.png)\n![b](https://h/b.png)\n";
        let refs = refs_for(&["https://h/a.png", "https://h/b.png"]);
        let mapping = mapping_for(&[
            ("https://h/a.png", "https://new/0"),
            ("https://h/b.png", "https://new/1"),
        ]);

        let out = apply_replacements(text, &refs, &mapping);
        assert_eq!(out.text, "![a](https://new/0)\n![b](https://new/1)\n");
        assert_eq!(out.replaced, 2);
        assert!(out.warnings.is_empty());
        assert!(!out.text.contains("https://h/"));
    }

    #[test]
    fn only_urls_change_rest_is_byte_identical() {
        let text = "# Title\n\nsome *prose* ![x](https://h/x.png) more prose\n";
        let refs = refs_for(&["https://h/x.png"]);
        let mapping = mapping_for(&[("https://h/x.png", "https://new/x")]);
        let out = apply_replacements(text, &refs, &mapping);
        assert_eq!(out.text, "# Title\n\nsome *prose* ![x](https://new/x) more prose\n");
    }

    #[test]
    fn replaces_every_occurrence_of_a_literal() {
        let text = "https://h/a.png and again https://h/a.png";
        let refs = refs_for(&["https://h/a.png"]);
        let mapping = mapping_for(&[("https://h/a.png", "U")]);
        let out = apply_replacements(text, &refs, &mapping);
        assert_eq!(out.text, "U and again U");
    }

    #[test]
    fn second_application_is_a_no_op() {
        let text = "![a](https://h/a.png)";
        let refs = refs_for(&["https://h/a.png"]);
        let mapping = mapping_for(&[("https://h/a.png", "https://new/0")]);

        let first = apply_replacements(text, &refs, &mapping);
        let second = apply_replacements(&first.text, &refs, &mapping);
        assert_eq!(second.text, first.text);
        assert_eq!(second.replaced, 0);
    }

    #[test]
    fn partial_mapping_replaces_prefix_and_warns_about_the_rest() {
        let text = "![a](https://h/a.png) ![b](https://h/b.png) ![c](https://h/c.png)";
        let refs = refs_for(&["https://h/a.png", "https://h/b.png", "https://h/c.png"]);
        let mapping = mapping_for(&[
            ("https://h/a.png", "U0"),
            ("https://h/b.png", "U1"),
        ]);

        let out = apply_replacements(text, &refs, &mapping);
        assert_eq!(out.text, "![a](U0) ![b](U1) ![c](https://h/c.png)");
        assert_eq!(out.replaced, 2);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("https://h/c.png"));
    }

    #[test]
    fn empty_mapping_warns_for_every_reference() {
        let text = "![a](https://h/a.png)";
        let refs = refs_for(&["https://h/a.png"]);
        let out = apply_replacements(text, &refs, &ReplacementMapping::new());
        assert_eq!(out.text, text);
        assert_eq!(out.warnings.len(), 1);
    }

    // Pins the known sharp edge: when one literal is a prefix of a later
    // one, the earlier whole-text replace mutates the longer literal before
    // its own turn comes, so the longer mapping entry finds nothing.
    #[test]
    fn prefix_collision_literal_is_mutated_early() {
        let text = "![a](https://h/a) ![b](https://h/a/b)";
        let refs = refs_for(&["https://h/a", "https://h/a/b"]);
        let mapping = mapping_for(&[
            ("https://h/a", "NEW_A"),
            ("https://h/a/b", "NEW_B"),
        ]);

        let out = apply_replacements(text, &refs, &mapping);
        assert_eq!(out.text, "![a](NEW_A) ![b](NEW_A/b)");
        assert_eq!(out.replaced, 1);
    }

    #[test]
    fn write_back_overwrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "old content that is longer").unwrap();
        write_back(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
