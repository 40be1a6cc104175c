//! URL path utilities.
//!
//! Provides consistent URL handling across the analyses:
//! - Path normalization (leading slash, query/fragment stripping)
//! - Link type detection (external vs internal)
//! - Relative link resolution against a page directory

/// Strip leading slash from a URL path
///
/// # Examples
/// ```
/// use sitecheck::utils::url::strip_leading_slash;
/// assert_eq!(strip_leading_slash("/guides/deploy"), "guides/deploy");
/// assert_eq!(strip_leading_slash("guides/deploy"), "guides/deploy");
/// assert_eq!(strip_leading_slash("/"), "");
/// ```
#[inline]
pub fn strip_leading_slash(url: &str) -> &str {
    url.trim_start_matches('/')
}

/// Check if a redirect target leaves the site
///
/// Only `http://`, `https://`, and protocol-relative `//` forms count;
/// anything else is followed as a site path.
///
/// # Examples
/// ```
/// use sitecheck::utils::url::is_external_url;
/// assert!(is_external_url("https://example.com/x"));
/// assert!(is_external_url("//cdn.example.com/x"));
/// assert!(!is_external_url("/guides/deploy"));
/// ```
#[inline]
pub fn is_external_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

/// Check if a link has a URL scheme (http:, mailto:, tel:, etc.)
///
/// A valid scheme must have at least 1 character before the colon and only
/// contain ASCII alphanumeric or `+`, `-`, `.`
///
/// # Examples
/// ```
/// use sitecheck::utils::url::has_scheme;
/// assert!(has_scheme("mailto:user@example.com"));
/// assert!(!has_scheme("/about"));
/// assert!(!has_scheme("./file.html"));
/// ```
#[inline]
pub fn has_scheme(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Strip query string and fragment from a URL path
///
/// # Examples
/// ```
/// use sitecheck::utils::url::strip_query_fragment;
/// assert_eq!(strip_query_fragment("/about?tab=1#team"), "/about");
/// assert_eq!(strip_query_fragment("/about"), "/about");
/// ```
#[inline]
pub fn strip_query_fragment(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(end) => &url[..end],
        None => url,
    }
}

/// Resolve a relative link against the directory of the page it appears on
///
/// `page_dir` is in site-root form (`/guides` for `/guides/page.html`). Dot
/// segments are normalized away; the result is in site-root form.
///
/// # Examples
/// ```
/// use sitecheck::utils::url::resolve_relative;
/// assert_eq!(resolve_relative("/guides", "deploy.html"), "/guides/deploy.html");
/// assert_eq!(resolve_relative("/guides/ci", "../api/index.html"), "/guides/api/index.html");
/// assert_eq!(resolve_relative("/", "index.html"), "/index.html");
/// ```
pub fn resolve_relative(page_dir: &str, rel: &str) -> String {
    let mut segments: Vec<&str> = page_dir
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(part),
        }
    }

    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_leading_slash() {
        assert_eq!(strip_leading_slash("/blog/post"), "blog/post");
        assert_eq!(strip_leading_slash("blog/post"), "blog/post");
        assert_eq!(strip_leading_slash("/"), "");
        assert_eq!(strip_leading_slash(""), "");
    }

    #[test]
    fn test_is_external_url() {
        assert!(is_external_url("http://example.com"));
        assert!(is_external_url("https://example.com/path"));
        assert!(is_external_url("//cdn.example.com/lib.js"));
        // Other schemes are site paths as far as redirect chains go
        assert!(!is_external_url("mailto:user@example.com"));
        assert!(!is_external_url("/about"));
        assert!(!is_external_url("about.html"));
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("https://example.com"));
        assert!(has_scheme("mailto:user@example.com"));
        assert!(has_scheme("urn:resource:123"));
        assert!(has_scheme("tel:+1234567890"));
        assert!(!has_scheme("/about"));
        assert!(!has_scheme("./file.txt"));
        assert!(!has_scheme("#section"));
    }

    #[test]
    fn test_strip_query_fragment() {
        assert_eq!(strip_query_fragment("/about?tab=1"), "/about");
        assert_eq!(strip_query_fragment("/about#team"), "/about");
        assert_eq!(strip_query_fragment("/about?tab=1#team"), "/about");
        assert_eq!(strip_query_fragment("/about"), "/about");
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve_relative("/guides", "deploy.html"), "/guides/deploy.html");
        assert_eq!(resolve_relative("/guides/ci", "../deploy.html"), "/guides/deploy.html");
        assert_eq!(resolve_relative("/a/b/c", "../../x.html"), "/a/x.html");
        assert_eq!(resolve_relative("/", "index.html"), "/index.html");
        assert_eq!(resolve_relative("/guides", "./deploy.html"), "/guides/deploy.html");
        // Escaping above the root stops at the root
        assert_eq!(resolve_relative("/a", "../../../x.html"), "/x.html");
    }
}
