//! Reference extraction: scan raw document text for image references.
//!
//! ## Dialects
//!
//! Four reference dialects are recognized, each with its own matching rule,
//! applied in a fixed priority order so a single mention is never counted
//! twice:
//!
//! 1. Generic image markup `![caption](URL)`, excluding Drive share-link
//!    URLs (those belong to dialect 2)
//! 2. Drive share links `![caption](https://drive.google.com/open?...id=ID)`,
//!    canonicalized to a direct-content URL for fetching
//! 3. Bare imgur URLs anywhere in the text (HackMD exports write images
//!    this way, outside any Markdown image markup)
//! 4. Front-matter banner declarations `image = "URL"`, excluding hosts
//!    that never need migration (unsplash serves the original forever)
//!
//! The `regex` crate has no look-around, so host exclusions are code
//! predicates over the match stream rather than negative lookaheads. The
//! exclusions are mutually disjoint, which is what keeps the dialects from
//! partially consuming each other's matches.
//!
//! ## Ordering contract
//!
//! The returned sequence is the concatenation of each dialect's matches in
//! dialect priority order, left-to-right within a dialect. It is NOT
//! re-sorted by text position: the rewriter applies replacements in exactly
//! this order, and the namer's counter runs over it.

use crate::config::{DialectSet, MigrationConfig};
use crate::reference::ImageReference;
use once_cell::sync::Lazy;
use regex::Regex;

/// Share-link host claimed by the Drive dialect and therefore excluded
/// from the generic dialect.
const DRIVE_SHARE_PREFIX: &str = "https://drive.google.com";

/// Direct-content URL template the extracted Drive file ID is substituted
/// into. The share link itself is not fetchable without a browser session.
const DRIVE_DIRECT_BASE: &str = "https://lh3.googleusercontent.com/d/";

// ── Dialect 1: generic image markup ─────────────────────────────────────────

// The optional ` "title"` inside the parentheses is matched but not part
// of the URL capture.
static RE_INLINE_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!\[([^\]]*)\]\(\s*([^)\s]+)(?:\s+"[^"]*")?\s*\)"#).unwrap());

// ── Dialect 2: Drive share links ────────────────────────────────────────────

static RE_DRIVE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"!\[([^\]]*)\]\((https://drive\.google\.com/open[^)\s"]*?id=([A-Za-z0-9_-]+)[^)\s"]*)(?:\s+"[^"]*")?\s*\)"#,
    )
    .unwrap()
});

// ── Dialect 3: bare imgur URLs ──────────────────────────────────────────────

static RE_IMGUR_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://(?:i\.)?imgur\.com/[^ \n)"]*"#).unwrap());

// ── Dialect 4: front-matter banner declarations ─────────────────────────────

static RE_BANNER: Lazy<Regex> = Lazy::new(|| Regex::new(r#"image\s*=\s*"([^"]+)""#).unwrap());

/// Extract the ordered reference sequence from raw document text.
///
/// `doc_stem` is the document's file name without extension; it is used to
/// synthesize captions for banner declarations (`<stem>_banner`).
///
/// References whose URL does not start with a recognized scheme prefix are
/// dropped rather than failing the pass.
pub fn extract_references(
    text: &str,
    doc_stem: &str,
    config: &MigrationConfig,
) -> Vec<ImageReference> {
    match config.dialects {
        DialectSet::Standard => {
            let mut refs = extract_inline(text);
            refs.extend(extract_drive(text));
            refs.extend(extract_banner(text, doc_stem, &config.external_hosts));
            refs
        }
        DialectSet::HackMd => extract_imgur(text),
    }
}

/// Dialect 1: `![caption](URL)` with non-Drive URLs.
fn extract_inline(text: &str) -> Vec<ImageReference> {
    RE_INLINE_IMAGE
        .captures_iter(text)
        .filter_map(|caps| {
            let url = &caps[2];
            // Drive share links belong to dialect 2.
            if url.starts_with(DRIVE_SHARE_PREFIX) {
                return None;
            }
            if !has_url_scheme(url) {
                return None;
            }
            Some(ImageReference::direct(&caps[1], url))
        })
        .collect()
}

/// Dialect 2: Drive share links, canonicalized for fetching.
///
/// `old_literal` stays the full share URL as it appears in the document;
/// `source_url` becomes the direct-content URL derived from the file ID,
/// independent of any other query parameters present.
fn extract_drive(text: &str) -> Vec<ImageReference> {
    RE_DRIVE_IMAGE
        .captures_iter(text)
        .map(|caps| ImageReference {
            caption: caps[1].to_string(),
            source_url: format!("{DRIVE_DIRECT_BASE}{}", &caps[3]),
            old_literal: caps[2].to_string(),
            local_name: String::new(),
        })
        .collect()
}

/// Dialect 3: bare imgur URLs, anywhere in the text. No caption exists,
/// so every reference falls back to the document-stem name.
fn extract_imgur(text: &str) -> Vec<ImageReference> {
    RE_IMGUR_BARE
        .find_iter(text)
        .map(|m| ImageReference::direct("", m.as_str()))
        .collect()
}

/// Dialect 4: `image = "URL"` banner declarations, excluding
/// always-external hosts. The caption is synthesized from the document
/// stem since the metadata line has no alt-text.
fn extract_banner(text: &str, doc_stem: &str, external_hosts: &[String]) -> Vec<ImageReference> {
    RE_BANNER
        .captures_iter(text)
        .filter_map(|caps| {
            let url = &caps[1];
            if external_hosts.iter().any(|h| url.starts_with(h.as_str())) {
                return None;
            }
            if !has_url_scheme(url) {
                return None;
            }
            Some(ImageReference::direct(format!("{doc_stem}_banner"), url))
        })
        .collect()
}

fn has_url_scheme(url: &str) -> bool {
    url.starts_with("http")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrationConfig;

    fn standard() -> MigrationConfig {
        MigrationConfig::default()
    }

    fn hackmd() -> MigrationConfig {
        MigrationConfig::builder()
            .dialects(DialectSet::HackMd)
            .build()
            .unwrap()
    }

    #[test]
    fn inline_image_with_caption() {
        let refs = extract_references("![A cat](https://host.example/cat.png)", "post", &standard());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].caption, "A cat");
        assert_eq!(refs[0].source_url, "https://host.example/cat.png");
        assert_eq!(refs[0].old_literal, "https://host.example/cat.png");
    }

    #[test]
    fn inline_title_not_part_of_url() {
        let refs = extract_references(
            r#"![cat](https://host.example/cat.png "hover text")"#,
            "post",
            &standard(),
        );
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].old_literal, "https://host.example/cat.png");
    }

    #[test]
    fn non_http_url_is_dropped() {
        let refs = extract_references("![local](./assets/cat.png)", "post", &standard());
        assert!(refs.is_empty());
    }

    #[test]
    fn drive_share_link_not_claimed_by_generic_dialect() {
        let text = "![d](https://drive.google.com/open?id=ABC123)";
        let refs = extract_references(text, "post", &standard());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].old_literal, "https://drive.google.com/open?id=ABC123");
        assert_eq!(
            refs[0].source_url,
            "https://lh3.googleusercontent.com/d/ABC123"
        );
    }

    #[test]
    fn drive_canonicalization_ignores_other_query_params() {
        let text = "![d](https://drive.google.com/open?usp=sharing&id=AbC-12_3&authuser=0)";
        let refs = extract_references(text, "post", &standard());
        assert_eq!(refs.len(), 1);
        assert_eq!(
            refs[0].source_url,
            "https://lh3.googleusercontent.com/d/AbC-12_3"
        );
        // The literal to replace is still the full share URL.
        assert_eq!(
            refs[0].old_literal,
            "https://drive.google.com/open?usp=sharing&id=AbC-12_3&authuser=0"
        );
    }

    #[test]
    fn banner_declaration_synthesizes_caption_from_stem() {
        let text = "+++\nimage = \"https://cdn.example/banner.jpg\"\n+++\n";
        let refs = extract_references(text, "my-post", &standard());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].caption, "my-post_banner");
        assert_eq!(refs[0].old_literal, "https://cdn.example/banner.jpg");
    }

    #[test]
    fn banner_external_host_is_skipped() {
        let text = "image = \"https://images.unsplash.com/photo-123\"\n";
        let refs = extract_references(text, "post", &standard());
        assert!(refs.is_empty());
    }

    #[test]
    fn imgur_dialect_matches_bare_urls() {
        let text = "before https://i.imgur.com/abc123.png after\nhttp://imgur.com/xyz\n";
        let refs = extract_references(text, "note", &hackmd());
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].old_literal, "https://i.imgur.com/abc123.png");
        assert_eq!(refs[1].old_literal, "http://imgur.com/xyz");
        assert!(refs[0].caption.is_empty());
    }

    #[test]
    fn imgur_url_stops_at_closing_paren_and_quote() {
        let text = r#"(https://i.imgur.com/a.png) "https://imgur.com/b""#;
        let refs = extract_references(text, "note", &hackmd());
        assert_eq!(refs[0].old_literal, "https://i.imgur.com/a.png");
        assert_eq!(refs[1].old_literal, "https://imgur.com/b");
    }

    #[test]
    fn standard_set_ignores_bare_imgur_urls() {
        let refs = extract_references("see https://i.imgur.com/abc.png", "post", &standard());
        assert!(refs.is_empty());
    }

    #[test]
    fn dialect_priority_order_not_text_order() {
        // A Drive link appears BEFORE a generic link in the text, but the
        // generic dialect runs first, so its match comes first in the
        // sequence. The rewriter depends on this exact ordering.
        let text = "\
![first](https://drive.google.com/open?id=DDD)
![second](https://host.example/x.png)
image = \"https://cdn.example/banner.jpg\"
";
        let refs = extract_references(text, "post", &standard());
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].old_literal, "https://host.example/x.png");
        assert_eq!(refs[1].old_literal, "https://drive.google.com/open?id=DDD");
        assert_eq!(refs[2].old_literal, "https://cdn.example/banner.jpg");
    }

    #[test]
    fn counts_every_mention_left_to_right_within_a_dialect() {
        let text = "\
![a](https://host.example/a.png)
text
![b](https://host.example/b.png) and ![c](https://host.example/c.png)
";
        let refs = extract_references(text, "post", &standard());
        let urls: Vec<_> = refs.iter().map(|r| r.old_literal.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://host.example/a.png",
                "https://host.example/b.png",
                "https://host.example/c.png"
            ]
        );
    }

    #[test]
    fn empty_document_yields_no_references() {
        assert!(extract_references("", "post", &standard()).is_empty());
        assert!(extract_references("no images here", "post", &standard()).is_empty());
    }
}
