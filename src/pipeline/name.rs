//! Caption sanitizing and local-name assignment.
//!
//! Staged files are named after the reference's caption so an operator can
//! recognize them in the staging directory, with two guarantees:
//!
//! * **Safe**: every character outside the alphanumeric set becomes the
//!   filler `_`, so the name contains no path separators or reserved
//!   punctuation on any filesystem.
//! * **Unique**: a zero-based discovery counter is appended to every name.
//!   The counter is shared across all dialects and runs over the combined
//!   sequence, so two references with identical captions (or two with empty
//!   captions) still get distinct names.

use crate::config::{FILLER, MAX_CAPTION_LEN};
use crate::reference::ImageReference;

/// Replace non-alphanumeric characters with the filler and truncate to
/// [`MAX_CAPTION_LEN`] characters. No counter suffix; see
/// [`assign_local_names`] for the full naming rule.
pub fn sanitize_caption(caption: &str) -> String {
    caption
        .chars()
        .take(MAX_CAPTION_LEN)
        .map(|c| if c.is_alphanumeric() { c } else { FILLER })
        .collect()
}

/// Assign every reference a distinct `local_name`, in sequence order.
///
/// Non-blank captions are sanitized; blank ones fall back to the document
/// stem. Either way the discovery index is appended, which makes the names
/// pairwise distinct within the document.
pub fn assign_local_names(references: &mut [ImageReference], doc_stem: &str) {
    for (counter, reference) in references.iter_mut().enumerate() {
        let base = if reference.caption.trim().is_empty() {
            doc_stem.to_string()
        } else {
            sanitize_caption(&reference.caption)
        };
        reference.local_name = format!("{base}_{counter}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ref(caption: &str) -> ImageReference {
        ImageReference::direct(caption, "https://host.example/x.png")
    }

    #[test]
    fn sanitize_replaces_every_non_alphanumeric() {
        assert_eq!(sanitize_caption("My Photo!"), "My_Photo_");
        assert_eq!(sanitize_caption("a/b\\c:d"), "a_b_c_d");
        let out = sanitize_caption("snapshot (2023), final?");
        assert!(out.chars().all(|c| c.is_alphanumeric() || c == '_'));
    }

    #[test]
    fn sanitize_keeps_unicode_alphanumerics() {
        assert_eq!(sanitize_caption("圖片 one"), "圖片_one");
    }

    #[test]
    fn sanitize_truncates_to_max_len() {
        let long: String = "x".repeat(300);
        assert_eq!(sanitize_caption(&long).chars().count(), MAX_CAPTION_LEN);
    }

    #[test]
    fn blank_caption_falls_back_to_doc_stem() {
        let mut refs = vec![make_ref(""), make_ref("   ")];
        assign_local_names(&mut refs, "my-post");
        assert_eq!(refs[0].local_name, "my-post_0");
        assert_eq!(refs[1].local_name, "my-post_1");
    }

    #[test]
    fn identical_captions_get_distinct_names() {
        let mut refs = vec![make_ref("diagram"), make_ref("diagram")];
        assign_local_names(&mut refs, "post");
        assert_eq!(refs[0].local_name, "diagram_0");
        assert_eq!(refs[1].local_name, "diagram_1");
        assert_ne!(refs[0].local_name, refs[1].local_name);
    }

    #[test]
    fn counter_is_shared_across_caption_kinds() {
        let mut refs = vec![make_ref(""), make_ref("My Photo!")];
        assign_local_names(&mut refs, "post");
        assert_eq!(refs[0].local_name, "post_0");
        assert_eq!(refs[1].local_name, "My_Photo__1");
    }
}
