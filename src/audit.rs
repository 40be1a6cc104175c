//! Full-site audit orchestration.
//!
//! Ties the analyses together for embedding tools: load the redirect table,
//! resolve and report chains, scan built pages for broken links, and hand
//! back everything needed for an exit code decision.

use anyhow::{Context, Result, bail};

use crate::config::AuditConfig;
use crate::links::{self, LinkAnalysis};
use crate::log;
use crate::redirect::{self, OutputDirOracle, RedirectAnalysis, RedirectMap};
use crate::utils::plural_count;

/// Results of a full audit run
#[derive(Debug)]
pub struct AuditOutcome {
    pub redirects: RedirectAnalysis,
    pub links: LinkAnalysis,
}

impl AuditOutcome {
    /// Whether the embedding tool should fail its run.
    pub fn has_problems(&self) -> bool {
        self.redirects.has_problems() || !self.links.is_empty()
    }
}

/// Run redirect and link analysis against the built output.
///
/// Per-chain and per-page findings are data in the returned
/// [`AuditOutcome`]; only missing inputs and unwritable reports are errors.
pub fn run_audit(config: &AuditConfig) -> Result<AuditOutcome> {
    let output_dir = config.output_dir();
    if !output_dir.is_dir() {
        bail!(
            "output directory `{}` does not exist; build the site first",
            output_dir.display()
        );
    }

    // Redirect chains
    let redirects_file = config.redirects_file();
    let map = RedirectMap::load(&redirects_file)
        .with_context(|| format!("loading redirect table `{}`", redirects_file.display()))?;
    log!("redirects"; "analyzing {}", plural_count(map.len(), "redirect"));

    let oracle = OutputDirOracle::new(&output_dir);
    let redirects = redirect::resolve(&map, &oracle);
    redirects.print();
    log!("redirects"; "{redirects}");

    if config.report.html {
        let report_path = output_dir.join("_redirects.html");
        redirects
            .write_html(&report_path)
            .with_context(|| format!("writing `{}`", report_path.display()))?;
        log!("redirects"; "report saved to {}", report_path.display());
    }

    // Broken links
    log!("links"; "scanning built pages");
    let links = links::analyze_site(&output_dir, &config.site.base_url);
    links.print();
    log!("links"; "{links}");

    if config.report.html {
        let report_path = output_dir.join("_broken_links.html");
        links
            .write_html(&report_path)
            .with_context(|| format!("writing `{}`", report_path.display()))?;
        log!("links"; "report saved to {}", report_path.display());
    }

    Ok(AuditOutcome { redirects, links })
}

// ============================================================================
// Tests
// ============================================================================
