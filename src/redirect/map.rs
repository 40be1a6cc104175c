//! Redirect table loading and lookup.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::log;

/// Errors rejecting a redirect table at load time
///
/// Malformed entries are refused here so the resolver never sees them.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("redirect table parsing error")]
    Json(#[from] serde_json::Error),

    #[error("redirect table must be a JSON object of source to target")]
    NotAnObject,

    #[error("redirect target for `{0}` must be a string")]
    NonStringTarget(String),

    #[error("redirect source `{0}` must start with `/`")]
    BadSource(String),
}

/// An ordered source -> target redirect table
///
/// Entry order follows the table file (it drives report ordering); lookups
/// go through a hash index. Sources are unique - re-inserting a source
/// replaces its target in place.
#[derive(Debug, Clone, Default)]
pub struct RedirectMap {
    entries: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl RedirectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a redirect table, choosing the format by file extension
    /// (`.md`/`.markdown` pipe table, anything else JSON).
    pub fn load(path: &Path) -> Result<Self, MapError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md" | "markdown") => Self::from_markdown_file(path),
            _ => Self::from_json_file(path),
        }
    }

    /// Load from a JSON object file (`redirects.json`).
    pub fn from_json_file(path: &Path) -> Result<Self, MapError> {
        let raw = fs::read_to_string(path).map_err(|e| MapError::Io(path.to_path_buf(), e))?;
        Self::from_json(&raw)
    }

    /// Parse a JSON object of `{"/source": "/target-or-url"}`.
    ///
    /// Object order is preserved into entry order.
    pub fn from_json(raw: &str) -> Result<Self, MapError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let serde_json::Value::Object(object) = value else {
            return Err(MapError::NotAnObject);
        };

        let mut map = Self::new();
        for (source, target) in object {
            let serde_json::Value::String(target) = target else {
                return Err(MapError::NonStringTarget(source));
            };
            if !source.starts_with('/') {
                return Err(MapError::BadSource(source));
            }
            map.insert(source, target);
        }
        Ok(map)
    }

    /// Load from a markdown pipe table (`redirect.md`).
    pub fn from_markdown_file(path: &Path) -> Result<Self, MapError> {
        let raw = fs::read_to_string(path).map_err(|e| MapError::Io(path.to_path_buf(), e))?;
        Ok(Self::from_markdown(&raw))
    }

    /// Parse markdown pipe-table rows (`| /old/path | /new/path-or-url |`).
    ///
    /// The file is hand-edited prose, so anything that is not a two-cell row
    /// with a `/` source and a `/` or `https` target is skipped rather than
    /// rejected.
    pub fn from_markdown(raw: &str) -> Self {
        let mut map = Self::new();
        for line in raw.lines() {
            let cells: Vec<&str> = line
                .split('|')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect();
            let &[source, target] = cells.as_slice() else {
                continue;
            };
            if !source.starts_with('/') {
                continue;
            }
            if !(target.starts_with('/') || target.starts_with("https")) {
                continue;
            }
            map.insert(source.to_string(), target.to_string());
        }
        map
    }

    /// Insert a redirect. A repeated source replaces the earlier target in
    /// place (JSON object semantics) and logs a warning.
    pub fn insert(&mut self, source: String, target: String) {
        if let Some(&slot) = self.index.get(&source) {
            log!("redirects"; "duplicate source `{}`, keeping the later target", source);
            self.entries[slot].1 = target;
        } else {
            self.index.insert(source.clone(), self.entries.len());
            self.entries.push((source, target));
        }
    }

    /// Exact target lookup.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.index.get(source).map(|&i| self.entries[i].1.as_str())
    }

    /// Extension-tolerant target lookup.
    ///
    /// Redirect tables mix extensioned and extensionless forms, so a hop
    /// matches a key exactly, or with `.html` stripped, or with `.html`
    /// appended.
    pub fn lookup_tolerant(&self, path: &str) -> Option<&str> {
        if let Some(target) = self.get(path) {
            return Some(target);
        }
        match path.strip_suffix(".html") {
            Some(stripped) => self.get(stripped),
            None => self.get(&format!("{path}.html")),
        }
    }

    /// Whether `path` is itself a redirect source (exact key).
    pub fn contains_source(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }
}
