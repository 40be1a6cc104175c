//! Broken-link report rendering: console report and HTML report.

use std::fmt;
use std::fs;
use std::path::Path;

use owo_colors::OwoColorize;

use super::scan::{BrokenLinkKind, LinkAnalysis};
use crate::utils::{plural_count, plural_s};

// ============================================================================
// Console Report
// ============================================================================

impl LinkAnalysis {
    /// Print the full report to stderr, grouped by page.
    pub fn print(&self) {
        if self.pages.is_empty() {
            return;
        }
        eprintln!();

        let page_count = self.page_count();
        let broken_count = self.broken_count();
        eprintln!(
            "{} {}",
            "broken links".red().bold(),
            format!(
                "({}, {} link{})",
                plural_count(page_count, "page"),
                broken_count,
                plural_s(broken_count)
            )
            .dimmed()
        );

        for (page, report) in &self.pages {
            eprintln!(
                "{}{}{} {}",
                "[".dimmed(),
                page.cyan(),
                "]".dimmed(),
                report.title.dimmed()
            );
            for link in &report.broken {
                if link.text.is_empty() {
                    eprintln!("{} {} {}", "→".red(), link.url, link.kind.reason().dimmed());
                } else {
                    eprintln!(
                        "{} {} {} {}",
                        "→".red(),
                        link.url,
                        format!("({})", link.text).dimmed(),
                        link.kind.reason().dimmed()
                    );
                }
            }
        }
    }
}

impl fmt::Display for LinkAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let broken = self.broken_count();
        if broken == 0 {
            write!(f, "{}", "all links valid".green())
        } else {
            write!(
                f,
                "{} {} {} {} {}",
                "found".dimmed(),
                broken.to_string().red().bold(),
                format!("broken link{} in", plural_s(broken)).dimmed(),
                self.page_count().to_string().red().bold(),
                format!("page{}", plural_s(self.page_count())).dimmed()
            )
        }
    }
}

// ============================================================================
// HTML Report
// ============================================================================

const HTML_STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
       line-height: 1.6; color: #333; max-width: 1000px; margin: 0 auto;
       padding: 20px; }
h1 { margin-bottom: 4px; }
.generated { color: #666; margin-top: 0; }
.no-links { color: #28a745; font-weight: bold; }
.page { margin-top: 20px; padding: 8px 12px; background: #f6f8fa; border-radius: 6px; }
.counter { background: #dc3545; color: white; border-radius: 10px; padding: 2px 8px;
           font-size: 0.8rem; margin-right: 8px; }
.crumb { color: #666; }
ul { margin: 8px 0 0 0; }
li { font-family: 'Menlo', monospace; font-size: 0.85rem; margin-bottom: 4px;
     word-break: break-all; }
.reason { color: #666; font-style: italic; font-family: inherit; }
";

impl LinkAnalysis {
    /// Write the self-contained HTML report.
    pub fn write_html(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_html())
    }

    /// Render the report as a standalone HTML document.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(8 * 1024);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str("<title>Broken Links Report</title>\n<style>\n");
        html.push_str(HTML_STYLE);
        html.push_str("</style>\n</head>\n<body>\n<h1>Broken Links Report</h1>\n");

        if self.pages.is_empty() {
            html.push_str("<p class=\"no-links\">No broken links found.</p>\n");
            html.push_str("</body>\n</html>\n");
            return html;
        }

        html.push_str(&format!(
            "<h2>{} broken links found in {} file{}.</h2>\n",
            self.broken_count(),
            self.page_count(),
            plural_s(self.page_count())
        ));

        for (page, report) in &self.pages {
            html.push_str("<div class=\"page\">");
            html.push_str(&format!(
                "<span class=\"counter\">{}</span>",
                report.broken.len()
            ));
            if !report.breadcrumb.is_empty() {
                let crumbs: Vec<String> = report.breadcrumb.iter().map(|c| escape(c)).collect();
                html.push_str(&format!(
                    "<span class=\"crumb\">{} &bull; </span>",
                    crumbs.join(" &bull; ")
                ));
            }
            html.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\"><strong>{}</strong></a></div>\n",
                escape(page),
                escape(&report.title)
            ));

            html.push_str("<ul>\n");
            for link in &report.broken {
                let shown = match link.kind {
                    BrokenLinkKind::Urn => escape(&link.url),
                    _ => format!(
                        "<a href=\"{}\" target=\"_blank\">{}</a>",
                        escape(&link.absolute),
                        escape(&link.url)
                    ),
                };
                html.push_str(&format!(
                    "<li>{} ({}) <span class=\"reason\">{}</span></li>\n",
                    shown,
                    escape(&link.text),
                    link.kind.reason()
                ));
            }
            html.push_str("</ul>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Minimal HTML escaping for report interpolation.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// Tests
// ============================================================================
