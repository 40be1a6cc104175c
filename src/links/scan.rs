//! HTML page scanning for broken internal links.
//!
//! Works on the raw HTML the CMS export ships. Links and page context are
//! pulled out with targeted patterns rather than a DOM pass; the export
//! format is stable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use jwalk::WalkDir;
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use rayon::prelude::*;
use regex::Regex;

use crate::debug;
use crate::redirect::{ExistenceOracle, OutputDirOracle};
use crate::utils::url::{has_scheme, resolve_relative, strip_query_fragment};

// ============================================================================
// Types
// ============================================================================

/// Why a link is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokenLinkKind {
    /// CMS editor preview link; never exists in published output.
    Preview,
    /// `urn:` reference the published site cannot resolve.
    Urn,
    /// Internal link whose target file is missing from the output.
    File,
}

impl BrokenLinkKind {
    /// Short reason for report rendering.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Preview => "unpublished preview link",
            Self::Urn => "unresolvable urn reference",
            Self::File => "not found",
        }
    }
}

/// A single broken link on a page
#[derive(Debug, Clone)]
pub struct BrokenLink {
    /// Link destination as written in the page.
    pub url: String,
    /// Site-root form the link resolves to.
    pub absolute: String,
    /// Anchor text.
    pub text: String,
    pub kind: BrokenLinkKind,
}

/// Broken links of one page, with display context
#[derive(Debug, Clone, Default)]
pub struct PageLinkReport {
    /// Page `<title>` content.
    pub title: String,
    /// Breadcrumb trail text (the root crumb is dropped, as in site chrome).
    pub breadcrumb: Vec<String>,
    pub broken: Vec<BrokenLink>,
}

/// Pages with at least one broken link, keyed by output-relative path
#[derive(Debug, Default)]
pub struct LinkAnalysis {
    pub pages: BTreeMap<String, PageLinkReport>,
}

impl LinkAnalysis {
    /// Pages with at least one broken link.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total broken links across all pages.
    pub fn broken_count(&self) -> usize {
        self.pages.values().map(|p| p.broken.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

// ============================================================================
// Extraction Patterns
// ============================================================================

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>(.*?)</title>").unwrap());
static BREADCRUMB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<ul class="breadcrumb">(.*?)</ul>"#).unwrap());
static CRUMB_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<li class="breadcrumb-link">\s*(.*?)\s*</li>"#).unwrap());
static PREVIEW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(/document/preview/[0-9]+[^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:src|href)="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

// ============================================================================
// Site Scan
// ============================================================================

/// Scan every page of a built site for broken links.
///
/// `base_url` marks absolute links that are still internal; empty means no
/// absolute link is checked. Pages scan in parallel, and page order in the
/// result is path-sorted regardless of completion order.
pub fn analyze_site(output_dir: &Path, base_url: &str) -> LinkAnalysis {
    let pages = collect_html_files(output_dir);
    let oracle = OutputDirOracle::new(output_dir);
    let analysis = Arc::new(RwLock::new(LinkAnalysis::default()));

    pages.par_iter().for_each(|page| {
        let rel = site_relative(output_dir, page);
        match std::fs::read_to_string(page) {
            Ok(content) => {
                let report = scan_content(&content, &rel, base_url, &oracle);
                if !report.broken.is_empty() {
                    analysis.write().pages.insert(rel, report);
                }
            }
            Err(e) => debug!("links"; "skipping {}: {}", rel, e),
        }
    });

    Arc::try_unwrap(analysis).unwrap().into_inner()
}

/// Collect site HTML files, excluding the 404 page and generated reports.
fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.ends_with(".html") && name != "404.html" && !name.starts_with('_')
        })
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

fn site_relative(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .to_string_lossy()
        .to_string()
}

// ============================================================================
// Page Scan
// ============================================================================

/// Scan one page's HTML for broken links.
///
/// `page_rel` is the page's output-relative path; relative links resolve
/// against its directory.
pub fn scan_content(
    content: &str,
    page_rel: &str,
    base_url: &str,
    oracle: &dyn ExistenceOracle,
) -> PageLinkReport {
    let title = TITLE_RE
        .captures(content)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_else(|| "Unknown title".to_string());

    let mut report = PageLinkReport {
        title,
        breadcrumb: extract_breadcrumb(content),
        broken: Vec::new(),
    };

    // Preview links never survive publishing; all of them are broken.
    for caps in PREVIEW_RE.captures_iter(content) {
        report.broken.push(BrokenLink {
            url: caps[1].to_string(),
            absolute: caps[1].to_string(),
            text: strip_tags(&caps[2]),
            kind: BrokenLinkKind::Preview,
        });
    }

    let dir = page_dir(page_rel);
    for caps in LINK_RE.captures_iter(content) {
        let url = &caps[1];
        if url.starts_with("/document/preview/") {
            continue;
        }
        let Some((kind, absolute)) = classify_checkable(url, &dir, base_url) else {
            continue;
        };

        let exists = match kind {
            BrokenLinkKind::Urn => false,
            _ => probe(oracle, &absolute),
        };
        if !exists {
            report.broken.push(BrokenLink {
                url: url.to_string(),
                absolute,
                text: strip_tags(&caps[2]),
                kind,
            });
        }
    }

    report
}

/// Decide whether a link is checkable against the output, and resolve it to
/// site-root form.
///
/// Checked: relative links, `urn:` references (reported unresolvable), and
/// absolute links on the site's own origin. Skipped: fragments, site-root
/// links (the redirect analysis owns those), and anything on another origin.
fn classify_checkable(url: &str, page_dir: &str, base_url: &str) -> Option<(BrokenLinkKind, String)> {
    if url.is_empty() || url.starts_with('#') {
        return None;
    }
    if url.starts_with("urn:") {
        return Some((BrokenLinkKind::Urn, url.to_string()));
    }
    if !base_url.is_empty()
        && let Some(rest) = url.strip_prefix(base_url)
    {
        let path = if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{rest}")
        };
        return Some((BrokenLinkKind::File, path));
    }
    if url.starts_with('/') || has_scheme(url) {
        return None;
    }
    Some((BrokenLinkKind::File, resolve_relative(page_dir, url)))
}

/// Probe a resolved link target, tolerant of query strings, fragments, and
/// percent-encoding. An unanswerable probe counts as missing here - the
/// link report is advisory, not a build gate.
fn probe(oracle: &dyn ExistenceOracle, absolute: &str) -> bool {
    let path = strip_query_fragment(absolute);
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    oracle.exists(&decoded).unwrap_or(false)
}

/// Site-root directory of a page (`/guides` for `guides/page.html`).
fn page_dir(page_rel: &str) -> String {
    match page_rel.rfind('/') {
        Some(idx) => format!("/{}", &page_rel[..idx]),
        None => "/".to_string(),
    }
}

/// Breadcrumb text items, with the root crumb dropped.
fn extract_breadcrumb(content: &str) -> Vec<String> {
    let Some(caps) = BREADCRUMB_RE.captures(content) else {
        return Vec::new();
    };
    CRUMB_ITEM_RE
        .captures_iter(&caps[1])
        .map(|item| strip_tags(&item[1]))
        .skip(1)
        .collect()
}

/// Strip markup from extracted anchor/crumb text.
fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::ProbeError;
    use rustc_hash::FxHashSet;

    struct StubOracle {
        existing: FxHashSet<String>,
    }

    impl StubOracle {
        fn with_paths(paths: &[&str]) -> Self {
            Self {
                existing: paths.iter().map(|p| p.to_string()).collect(),
            }
        }
    }

    impl ExistenceOracle for StubOracle {
        fn exists(&self, path: &str) -> Result<bool, ProbeError> {
            Ok(self.existing.contains(path))
        }
    }

    const PAGE: &str = r##"<html><head><title> Deploying apps </title></head>
<body>
<ul class="breadcrumb">
  <li class="breadcrumb-link"><a href="index.html">Home</a></li>
  <li class="breadcrumb-link"><a href="deploy/index.html">Deploy</a></li>
  <li class="breadcrumb-link">Deploying apps</li>
</ul>
<a href="/document/preview/12345?lang=en">draft page</a>
<a href="existing.html">fine link</a>
<a href="missing.html">dead link</a>
<a href="urn:resource:uuid:999">urn link</a>
<a href="https://elsewhere.example.com/page">other site</a>
<a href="#section">anchor</a>
<a href="/site-root/page.html">root link</a>
</body></html>"##;

    #[test]
    fn test_scan_reports_broken_links_only() {
        let oracle = StubOracle::with_paths(&[
            "/guides/existing.html",
            "/guides/index.html",
            "/guides/deploy/index.html",
        ]);
        let report = scan_content(PAGE, "guides/page.html", "", &oracle);

        assert_eq!(report.title, "Deploying apps");
        assert_eq!(report.breadcrumb, ["Deploy", "Deploying apps"]);

        let kinds: Vec<BrokenLinkKind> = report.broken.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            [
                BrokenLinkKind::Preview,
                BrokenLinkKind::File,
                BrokenLinkKind::Urn
            ]
        );
        assert_eq!(report.broken[0].url, "/document/preview/12345?lang=en");
        assert_eq!(report.broken[1].absolute, "/guides/missing.html");
        // External origins, fragments, and site-root links are not checked
        assert!(!report.broken.iter().any(|l| l.url.contains("elsewhere")));
        assert!(!report.broken.iter().any(|l| l.url.starts_with('#')));
        assert!(!report.broken.iter().any(|l| l.url.starts_with("/site-root")));
    }

    #[test]
    fn test_own_origin_links_are_checked() {
        let oracle = StubOracle::with_paths(&[]);
        let content = r#"<a href="https://docs.example.com/guides/gone.html">gone</a>"#;
        let report = scan_content(content, "index.html", "https://docs.example.com", &oracle);
        assert_eq!(report.broken.len(), 1);
        assert_eq!(report.broken[0].absolute, "/guides/gone.html");
        assert_eq!(report.broken[0].kind, BrokenLinkKind::File);
    }

    #[test]
    fn test_query_and_encoding_tolerated() {
        let oracle = StubOracle::with_paths(&["/guides/my page.html"]);
        let content = r#"<a href="my%20page.html?lang=en#top">spaced</a>"#;
        let report = scan_content(content, "guides/index.html", "", &oracle);
        assert!(report.broken.is_empty());
    }

    #[test]
    fn test_relative_traversal_resolves_against_page_dir() {
        let oracle = StubOracle::with_paths(&["/api/index.html"]);
        let content = r#"<a href="../api/index.html">api</a><a href="../missing/x.html">x</a>"#;
        let report = scan_content(content, "guides/page.html", "", &oracle);
        assert_eq!(report.broken.len(), 1);
        assert_eq!(report.broken[0].absolute, "/missing/x.html");
    }

    #[test]
    fn test_analyze_site_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("guides")).unwrap();
        std::fs::write(root.join("guides/ok.html"), "<html></html>").unwrap();
        std::fs::write(
            root.join("guides/page.html"),
            r#"<title>Page</title><a href="ok.html">ok</a><a href="gone.html">gone</a>"#,
        )
        .unwrap();
        std::fs::write(root.join("clean.html"), r#"<title>Clean</title>"#).unwrap();
        // Excluded from scanning entirely
        std::fs::write(root.join("404.html"), r#"<a href="nope.html">x</a>"#).unwrap();
        std::fs::write(root.join("_broken_links.html"), r#"<a href="nope.html">x</a>"#)
            .unwrap();

        let analysis = analyze_site(root, "");
        assert_eq!(analysis.page_count(), 1);
        assert_eq!(analysis.broken_count(), 1);
        let (page, report) = analysis.pages.iter().next().unwrap();
        assert_eq!(page, "guides/page.html");
        assert_eq!(report.broken[0].absolute, "/guides/gone.html");
    }

    #[test]
    fn test_page_dir() {
        assert_eq!(page_dir("guides/deploy/page.html"), "/guides/deploy");
        assert_eq!(page_dir("index.html"), "/");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<strong>Deploy</strong> apps"), "Deploy apps");
        assert_eq!(strip_tags("plain"), "plain");
        assert_eq!(strip_tags("  spaced \n text "), "spaced text");
    }
}
