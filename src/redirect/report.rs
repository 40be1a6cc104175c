//! Redirect analysis rendering: console report and HTML report.

use std::fmt;
use std::fs;
use std::path::Path;

use owo_colors::OwoColorize;

use super::group::{RedirectAnalysis, TargetGroup};
use crate::utils::{plural_count, plural_s};

/// Groups shown per console section before truncating with a `+N more` line.
const MAX_GROUPS: usize = 10;
/// Chains shown per console group before truncating.
const MAX_CHAINS: usize = 3;

// ============================================================================
// Console Report
// ============================================================================

impl RedirectAnalysis {
    /// Print the full report to stderr
    /// (valid -> external -> suffix -> missing -> circular -> probe failures).
    pub fn print(&self) {
        self.print_groups("valid targets", &self.valid, |s| s.green().bold().to_string());
        self.print_groups("external targets", &self.external, |s| {
            s.blue().bold().to_string()
        });
        self.print_groups("suffix-preserving", &self.suffix_preserving, |s| {
            s.cyan().bold().to_string()
        });
        self.print_groups("missing targets", &self.missing, |s| {
            s.red().bold().to_string()
        });
        self.print_circular();
        self.print_probe_failures();
    }

    /// Print one grouped classification section.
    fn print_groups(&self, name: &str, groups: &[TargetGroup], style: fn(&str) -> String) {
        if groups.is_empty() {
            return;
        }
        let chain_count: usize = groups.iter().map(|g| g.members.len()).sum();

        eprintln!();
        eprintln!(
            "{} {}",
            style(name),
            format!(
                "({} unique, {})",
                groups.len(),
                plural_count(chain_count, "redirect")
            )
            .dimmed()
        );

        for group in groups.iter().take(MAX_GROUPS) {
            eprintln!(
                "{}{}{} {}",
                "[".dimmed(),
                group.target.cyan(),
                "]".dimmed(),
                format!("({})", plural_count(group.members.len(), "redirect")).dimmed()
            );
            if let Some(resolved) = &group.resolved {
                eprintln!("  {} {}", "file:".dimmed(), resolved);
            }
            for member in group.members.iter().take(MAX_CHAINS) {
                eprintln!("  {} {}", "→".dimmed(), format_chain(&member.chain));
            }
            let hidden = group.members.len().saturating_sub(MAX_CHAINS);
            if hidden > 0 {
                eprintln!("  {}", format!("+{hidden} more").dimmed());
            }
        }
        let hidden = groups.len().saturating_sub(MAX_GROUPS);
        if hidden > 0 {
            eprintln!("{}", format!("... and {hidden} more targets").dimmed());
        }
    }

    fn print_circular(&self) {
        if self.circular.is_empty() {
            return;
        }
        eprintln!();
        eprintln!(
            "{} {}",
            "circular redirects".yellow().bold(),
            format!("({})", self.circular.len()).dimmed()
        );
        for chain in &self.circular {
            eprintln!("  {} {}", "↻".yellow(), chain.join(" → "));
        }
    }

    fn print_probe_failures(&self) {
        if self.probe_failures.is_empty() {
            return;
        }
        eprintln!();
        eprintln!(
            "{} {}",
            "probe failures".red().bold(),
            format!("({})", self.probe_failures.len()).dimmed()
        );
        for failure in &self.probe_failures {
            eprintln!(
                "  {} {} {}",
                "→".red(),
                format_chain(&failure.chain),
                format!("({})", failure.error).dimmed()
            );
        }
    }
}

impl fmt::Display for RedirectAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let broken =
            self.missing_chain_count() + self.circular.len() + self.probe_failures.len();
        if broken == 0 {
            write!(
                f,
                "{} {}",
                plural_count(self.total, "redirect").green(),
                "ok".green()
            )
        } else {
            write!(
                f,
                "{} {} {}",
                "found".dimmed(),
                broken.to_string().red().bold(),
                format!("broken redirect{}", plural_s(broken)).dimmed()
            )
        }
    }
}

/// Render a hop sequence (`/a → /b → /c`); single-hop chains show the
/// source alone.
fn format_chain(chain: &[String]) -> String {
    match chain {
        [source] => source.clone(),
        _ => chain.join(" → "),
    }
}

// ============================================================================
// HTML Report
// ============================================================================

const HTML_STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
       line-height: 1.6; color: #333; max-width: 1100px; margin: 0 auto;
       padding: 20px; background-color: #f8f9fa; }
h1 { margin-bottom: 4px; }
.generated { color: #666; margin-top: 0; }
.summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
           gap: 16px; margin: 24px 0; }
.card { background: white; padding: 16px; border-radius: 8px; text-align: center;
        box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
.card h3 { margin: 0 0 6px 0; color: #666; font-size: 0.8rem; text-transform: uppercase; }
.card .number { font-size: 1.8rem; font-weight: bold; }
.valid { color: #28a745; }
.external { color: #007bff; }
.suffix { color: #17a2b8; }
.missing { color: #dc3545; }
.circular { color: #ffc107; }
.section { background: white; border-radius: 8px; margin-bottom: 20px;
           box-shadow: 0 2px 8px rgba(0,0,0,0.08); padding: 12px 20px; }
.section h2 { font-size: 1.1rem; border-bottom: 1px solid #eee; padding-bottom: 8px; }
details { border: 1px solid #e1e5e9; border-radius: 6px; margin-bottom: 8px; }
details summary { padding: 10px 14px; cursor: pointer; font-weight: 600;
                  font-family: 'Menlo', monospace; font-size: 0.85rem; }
.count { background: #6c757d; color: white; font-size: 0.75rem; padding: 2px 8px;
         border-radius: 10px; margin-left: 8px; }
.body { padding: 0 14px 10px 14px; border-top: 1px solid #e1e5e9; }
.chain { font-family: 'Menlo', monospace; font-size: 0.8rem; background: #f6f8fa;
         border-radius: 4px; padding: 6px 10px; margin: 6px 0; word-break: break-all; }
.file { font-family: 'Menlo', monospace; font-size: 0.8rem; color: #666;
        margin-top: 8px; }
.empty { color: #666; font-style: italic; }
";

impl RedirectAnalysis {
    /// Write the self-contained HTML report.
    pub fn write_html(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_html())
    }

    /// Render the report as a standalone HTML document.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(16 * 1024);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        html.push_str("<title>Redirect Analysis Report</title>\n<style>\n");
        html.push_str(HTML_STYLE);
        html.push_str("</style>\n</head>\n<body>\n<h1>Redirect Analysis Report</h1>\n");
        html.push_str(&format!(
            "<p class=\"generated\">Generated at {} UTC</p>\n",
            now_utc()
        ));

        // Summary cards
        html.push_str("<div class=\"summary\">\n");
        summary_card(&mut html, "Total Redirects", "", self.total);
        summary_card(&mut html, "Valid", "valid", self.valid_chain_count());
        summary_card(&mut html, "External", "external", self.external_chain_count());
        summary_card(&mut html, "Suffix", "suffix", self.suffix_chain_count());
        summary_card(&mut html, "Missing", "missing", self.missing_chain_count());
        summary_card(&mut html, "Circular", "circular", self.circular.len());
        html.push_str("</div>\n");

        group_section(&mut html, "Valid Targets", "valid", &self.valid);
        group_section(&mut html, "External Targets", "external", &self.external);
        group_section(
            &mut html,
            "Suffix-Preserving Targets",
            "suffix",
            &self.suffix_preserving,
        );
        group_section(&mut html, "Missing Targets", "missing", &self.missing);
        self.circular_section(&mut html);
        self.probe_section(&mut html);

        html.push_str("</body>\n</html>\n");
        html
    }

    fn circular_section(&self, html: &mut String) {
        html.push_str("<div class=\"section\">\n<h2 class=\"circular\">Circular Redirects</h2>\n");
        if self.circular.is_empty() {
            html.push_str("<p class=\"empty\">No circular redirects found.</p>\n");
        } else {
            for chain in &self.circular {
                html.push_str(&format!(
                    "<div class=\"chain\">{}</div>\n",
                    escape(&chain.join(" → "))
                ));
            }
        }
        html.push_str("</div>\n");
    }

    fn probe_section(&self, html: &mut String) {
        if self.probe_failures.is_empty() {
            return;
        }
        html.push_str("<div class=\"section\">\n<h2 class=\"missing\">Probe Failures</h2>\n");
        for failure in &self.probe_failures {
            html.push_str(&format!(
                "<div class=\"chain\">{} <em>({})</em></div>\n",
                escape(&failure.chain.join(" → ")),
                escape(&failure.error.to_string())
            ));
        }
        html.push_str("</div>\n");
    }
}

fn summary_card(html: &mut String, title: &str, class: &str, count: usize) {
    html.push_str(&format!(
        "<div class=\"card\"><h3>{title}</h3><div class=\"number {class}\">{count}</div></div>\n"
    ));
}

fn group_section(html: &mut String, title: &str, class: &str, groups: &[TargetGroup]) {
    let chain_count: usize = groups.iter().map(|g| g.members.len()).sum();
    html.push_str(&format!(
        "<div class=\"section\">\n<h2 class=\"{class}\">{title} ({} unique, {} redirects)</h2>\n",
        groups.len(),
        chain_count
    ));
    if groups.is_empty() {
        html.push_str("<p class=\"empty\">None found.</p>\n");
    }
    for group in groups {
        html.push_str(&format!(
            "<details><summary>{}<span class=\"count\">{}</span></summary>\n<div class=\"body\">\n",
            escape(&group.target),
            group.members.len()
        ));
        if let Some(resolved) = &group.resolved {
            html.push_str(&format!("<div class=\"file\">File: {}</div>\n", escape(resolved)));
        }
        for member in &group.members {
            html.push_str(&format!(
                "<div class=\"chain\">{}</div>\n",
                escape(&member.chain.join(" → "))
            ));
        }
        html.push_str("</div>\n</details>\n");
    }
    html.push_str("</div>\n");
}

/// Minimal HTML escaping for report interpolation.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Current time formatted as HH:MM:SS (UTC, good enough for a report stamp).
fn now_utc() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

// ============================================================================
// Tests
// ============================================================================
