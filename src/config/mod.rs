//! Audit configuration management for `sitecheck.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                         |
//! |------------|-------------------------------------------------|
//! | `[site]`   | Site identity (canonical base URL)              |
//! | `[paths]`  | Built output directory and redirect table file  |
//! | `[report]` | HTML report emission                            |
//!
//! All sections are optional; the defaults match the conventional layout of
//! a build directory (`out/` next to `redirects.json`).

mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sitecheck.toml
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub report: ReportSection,
}

/// `[site]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Canonical site origin (e.g. `https://docs.example.com`). Absolute
    /// links on this origin are treated as internal and checked against the
    /// output directory. Empty means "no absolute link is internal".
    pub base_url: String,
}

/// `[paths]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Built site output directory, relative to the project root.
    pub output: PathBuf,

    /// Redirect table file (`.json` object or `.md` pipe table).
    pub redirects: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            output: PathBuf::from("out"),
            redirects: PathBuf::from("redirects.json"),
        }
    }
}

/// `[report]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Write HTML reports into the output directory.
    pub html: bool,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self { html: true }
    }
}

impl AuditConfig {
    /// Build a default configuration rooted at `root` (callers embedding the
    /// crate without a config file).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            site: SiteSection::default(),
            paths: PathsSection::default(),
            report: ReportSection::default(),
        }
    }

    /// Load configuration from a `sitecheck.toml` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: Self = toml::from_str(&raw)?;
        config.root = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Project root directory (the config file's parent).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path to the built output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.paths.output)
    }

    /// Absolute path to the redirect table file.
    pub fn redirects_file(&self) -> PathBuf {
        self.root.join(&self.paths.redirects)
    }

    /// Normalize fields after loading.
    ///
    /// `base_url` comparisons are prefix-based; a trailing slash would make
    /// `/x` on the same origin resolve as `//x`.
    fn normalize(&mut self) {
        while self.site.base_url.ends_with('/') {
            self.site.base_url.pop();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.base_url.is_empty()
            && !self.site.base_url.starts_with("http://")
            && !self.site.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "site.base_url must be an absolute http(s) origin, got `{}`",
                self.site.base_url
            )));
        }
        if self.paths.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "paths.output must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
