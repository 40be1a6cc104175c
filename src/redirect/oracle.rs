//! Existence probing against built output.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::url::strip_leading_slash;

/// Failure of an existence probe
///
/// Not a missing file - an unanswerable question. Kept distinct so a flaky
/// filesystem never masquerades as a broken redirect.
#[derive(Debug, Error)]
#[error("existence probe failed for `{path}`")]
pub struct ProbeError {
    /// Site path whose probe failed.
    pub path: String,

    #[source]
    pub source: std::io::Error,
}

/// Answers "does this site path exist in the built output?"
///
/// Probes are read-only and order-independent; the resolver applies its own
/// `.html` tolerance on top, so implementations check the literal path only.
pub trait ExistenceOracle {
    fn exists(&self, path: &str) -> Result<bool, ProbeError>;
}

/// Filesystem oracle rooted at a built output directory
#[derive(Debug, Clone)]
pub struct OutputDirOracle {
    root: PathBuf,
}

impl OutputDirOracle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output directory this oracle probes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Disk path for a site path (leading slash stripped).
    pub fn disk_path(&self, path: &str) -> PathBuf {
        self.root.join(strip_leading_slash(path))
    }
}

impl ExistenceOracle for OutputDirOracle {
    fn exists(&self, path: &str) -> Result<bool, ProbeError> {
        self.disk_path(path).try_exists().map_err(|e| ProbeError {
            path: path.to_string(),
            source: e,
        })
    }
}
