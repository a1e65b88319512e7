//! Pipeline stages for the Markdown image migration.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different storage backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ name ──▶ fetch ──▶ (upload) ──▶ rewrite
//! (regexes)  (sanitize) (HTTP GET)  (backend)   (substitution)
//! ```
//!
//! 1. [`extract`] — scan raw document text into an ordered sequence of
//!    [`crate::reference::ImageReference`]s
//! 2. [`name`]    — assign each reference a filesystem-safe, collision-free
//!    local filename
//! 3. [`fetch`]   — download each source URL to its staged local path
//! 4. upload      — handled by a [`crate::backend::Uploader`], which returns
//!    one new URL per staged asset
//! 5. [`rewrite`] — substitute old literals with new URLs, in discovery
//!    order, and write the document back

pub mod extract;
pub mod fetch;
pub mod name;
pub mod rewrite;
