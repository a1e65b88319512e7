//! Configuration types for a migration run.
//!
//! All behaviour is controlled through [`MigrationConfig`], built via its
//! [`MigrationConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to log a run's configuration and to diff two runs to understand
//! why their outputs differ.

use crate::error::MigrateError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Captions longer than this are truncated before the counter suffix is
/// appended, so local names stay comfortably below filesystem limits.
pub const MAX_CAPTION_LEN: usize = 100;

/// Replaces every non-alphanumeric caption character in local names.
pub const FILLER: char = '_';

/// Which set of reference dialects the extractor applies.
///
/// The sets are alternatives, not layers: a HackMD export marks its images
/// as bare imgur links rather than `![...](...)` markup, so scanning for
/// both at once would double-count nothing but also helps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DialectSet {
    /// Generic image markup + Drive share links + front-matter banner
    /// declarations. (default)
    #[default]
    Standard,
    /// Bare imgur URLs anywhere in the text, as HackMD writes them.
    HackMd,
}

/// Configuration for a migration run.
///
/// Built via [`MigrationConfig::builder()`] or [`MigrationConfig::default()`].
///
/// # Example
/// ```rust
/// use mdimg_migrate::MigrationConfig;
///
/// let config = MigrationConfig::builder()
///     .staging_dir("tmp")
///     .download_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Directory where fetched assets are staged before upload. Default: `tmp`.
    ///
    /// Deliberately left in place after a run: a restart skips re-fetching
    /// any asset whose staged file already exists.
    pub staging_dir: PathBuf,

    /// Which reference dialects to recognize. Default: [`DialectSet::Standard`].
    pub dialects: DialectSet,

    /// Skip fetching an asset whose staged file already exists. Default: true.
    ///
    /// Coarse idempotence only — a partially written file from a crashed
    /// run is also skipped. Disable to force a clean re-fetch.
    pub skip_staged: bool,

    /// Remote container (Drive folder / Photos album) name. Default: None,
    /// meaning each document uses its own file stem, so one document's
    /// images land together.
    pub container_name: Option<String>,

    /// HTTP timeout for asset downloads in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Banner-declaration hosts that never need migration. Default:
    /// `["https://images.unsplash.com"]`.
    pub external_hosts: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("tmp"),
            dialects: DialectSet::Standard,
            skip_staged: true,
            container_name: None,
            download_timeout_secs: 120,
            external_hosts: vec!["https://images.unsplash.com".to_string()],
        }
    }
}

impl MigrationConfig {
    /// Create a new builder for `MigrationConfig`.
    pub fn builder() -> MigrationConfigBuilder {
        MigrationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MigrationConfig`].
#[derive(Debug)]
pub struct MigrationConfigBuilder {
    config: MigrationConfig,
}

impl MigrationConfigBuilder {
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.staging_dir = dir.into();
        self
    }

    pub fn dialects(mut self, set: DialectSet) -> Self {
        self.config.dialects = set;
        self
    }

    pub fn skip_staged(mut self, v: bool) -> Self {
        self.config.skip_staged = v;
        self
    }

    pub fn container_name(mut self, name: impl Into<String>) -> Self {
        self.config.container_name = Some(name.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn external_host(mut self, host: impl Into<String>) -> Self {
        self.config.external_hosts.push(host.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MigrationConfig, MigrateError> {
        let c = &self.config;
        if c.staging_dir.as_os_str().is_empty() {
            return Err(MigrateError::InvalidConfig(
                "Staging directory must not be empty".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(MigrateError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref name) = c.container_name {
            if name.trim().is_empty() {
                return Err(MigrateError::InvalidConfig(
                    "Container name must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
