//! Sitecheck - redirect and link auditing for prebuilt documentation sites.
//!
//! The crate consumes the output directory of a documentation build together
//! with its redirect table, and produces classified, grouped reports:
//!
//! - [`redirect`]: resolve multi-hop redirect chains against the built
//!   output, classifying every chain as valid, external, circular, missing,
//!   or suffix-preserving.
//! - [`links`]: scan built HTML pages for broken internal links.
//! - [`audit`]: run both analyses from a single [`config::AuditConfig`].
//!
//! There is no CLI here; the embedding tool owns argument handling and calls
//! [`audit::run_audit`] (or the individual analyses) directly.

pub mod audit;
pub mod config;
pub mod links;
pub mod logger;
pub mod redirect;
pub mod utils;

pub use audit::{AuditOutcome, run_audit};
pub use config::AuditConfig;
pub use redirect::{
    ChainResult, ExistenceOracle, OutputDirOracle, RedirectAnalysis, RedirectMap,
};
