//! Broken-link analysis of built HTML pages.
//!
//! Scans every page the build produced for internal links that no longer
//! resolve: CMS preview leftovers, `urn:` references, and plain links whose
//! target file is missing from the output.

pub mod report;
pub mod scan;

pub use scan::{BrokenLink, BrokenLinkKind, LinkAnalysis, PageLinkReport, analyze_site};
