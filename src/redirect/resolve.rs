//! Redirect chain walking and classification.
//!
//! Every table source starts at most one chain. A chain follows successive
//! extension-tolerant lookups until it reaches an external URL, revisits one
//! of its own hops, or runs off the table; terminal paths are then probed
//! against the built output. Sources already covered as hops of an earlier
//! chain never start a top-level chain of their own, so a sub-chain is not
//! reported twice.

use rustc_hash::FxHashSet;

use super::map::RedirectMap;
use super::oracle::{ExistenceOracle, ProbeError};
use crate::utils::url::is_external_url;

/// Placeholder marking "preserve the remaining path suffix" targets.
const SUFFIX_PLACEHOLDER: &str = "$1";

// ============================================================================
// Chain Results
// ============================================================================

/// Classified outcome of a single redirect chain
#[derive(Debug)]
pub enum ChainResult {
    /// Terminal target exists in the built output.
    Valid {
        chain: Vec<String>,
        /// Terminal target as written in the table.
        target: String,
        /// Path variant that satisfied the existence probe.
        resolved: String,
    },

    /// Chain left the site for an absolute or protocol-relative URL.
    External { chain: Vec<String>, url: String },

    /// Chain revisited one of its own hops. The repeated hop is the last
    /// chain element.
    Circular { chain: Vec<String> },

    /// Terminal target does not exist in the built output.
    Missing { chain: Vec<String>, target: String },

    /// Terminal target carries a suffix placeholder; existence is not
    /// decidable per-path, and the chain is never reported as broken.
    SuffixPreserving { chain: Vec<String>, target: String },

    /// The oracle could not answer for the terminal target.
    Probe(ProbeFailure),
}

/// A chain whose terminal existence probe failed
#[derive(Debug)]
pub struct ProbeFailure {
    pub chain: Vec<String>,
    /// Terminal target whose probe failed.
    pub target: String,
    pub error: ProbeError,
}

impl ChainResult {
    /// Originating table source of the chain.
    pub fn source(&self) -> &str {
        &self.chain()[0]
    }

    /// Full hop sequence, source first.
    pub fn chain(&self) -> &[String] {
        match self {
            Self::Valid { chain, .. }
            | Self::External { chain, .. }
            | Self::Circular { chain }
            | Self::Missing { chain, .. }
            | Self::SuffixPreserving { chain, .. } => chain,
            Self::Probe(failure) => &failure.chain,
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve every table source into at most one classified chain.
///
/// Iterates in table order and walks each chain sequentially, so the result
/// order is deterministic for a given table and oracle. Sources reached as
/// hops of an earlier chain are skipped as starting points; every source
/// still appears in exactly one result chain.
pub fn resolve_chains(map: &RedirectMap, oracle: &dyn ExistenceOracle) -> Vec<ChainResult> {
    let mut results = Vec::new();
    let mut covered: FxHashSet<String> = FxHashSet::default();

    for (source, target) in map.iter() {
        if covered.contains(source) {
            continue;
        }

        let result = walk_chain(map, oracle, source, target);

        // Hops that are themselves table sources are now covered: this chain
        // already reports their fate. Terminal targets that are not sources
        // were never candidate starting points.
        for hop in result.chain() {
            if map.contains_source(hop) {
                covered.insert(hop.clone());
            }
        }

        results.push(result);
    }

    results
}

/// Follow one source through the table until termination.
fn walk_chain(
    map: &RedirectMap,
    oracle: &dyn ExistenceOracle,
    source: &str,
    first_target: &str,
) -> ChainResult {
    let mut chain = vec![source.to_string()];
    let mut visited: FxHashSet<String> = FxHashSet::default();
    visited.insert(source.to_string());

    let mut current = first_target.to_string();

    while !is_external_url(&current) {
        if visited.contains(&current) {
            // Cycle: record the repeated hop as the chain's last element.
            chain.push(current);
            return ChainResult::Circular { chain };
        }

        chain.push(current.clone());
        visited.insert(current.clone());

        match map.lookup_tolerant(&current) {
            Some(next) => current = next.to_string(),
            None => return classify_terminal(oracle, chain, current),
        }
    }

    ChainResult::External {
        chain,
        url: current,
    }
}

/// Classify a chain whose last hop is not itself a redirect source.
fn classify_terminal(
    oracle: &dyn ExistenceOracle,
    chain: Vec<String>,
    target: String,
) -> ChainResult {
    if target.contains(SUFFIX_PLACEHOLDER) {
        return ChainResult::SuffixPreserving { chain, target };
    }

    match probe_tolerant(oracle, &target) {
        Ok(Some(resolved)) => ChainResult::Valid {
            chain,
            target,
            resolved,
        },
        Ok(None) => ChainResult::Missing { chain, target },
        Err(error) => ChainResult::Probe(ProbeFailure {
            chain,
            target,
            error,
        }),
    }
}

/// Probe a terminal target with the same `.html` tolerance used for lookups,
/// mirroring extensionless static-file serving.
///
/// Returns the path variant that exists, if any.
fn probe_tolerant(
    oracle: &dyn ExistenceOracle,
    target: &str,
) -> Result<Option<String>, ProbeError> {
    if oracle.exists(target)? {
        return Ok(Some(target.to_string()));
    }

    let variant = match target.strip_suffix(".html") {
        Some(stripped) => stripped.to_string(),
        None => format!("{target}.html"),
    };
    if oracle.exists(&variant)? {
        return Ok(Some(variant));
    }

    Ok(None)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Oracle over a fixed path set, with optional paths that fail to probe.
    #[derive(Default)]
    struct StubOracle {
        existing: FxHashSet<String>,
        failing: FxHashSet<String>,
    }

    impl StubOracle {
        fn with_paths(paths: &[&str]) -> Self {
            Self {
                existing: paths.iter().map(|p| p.to_string()).collect(),
                failing: FxHashSet::default(),
            }
        }

        fn failing_on(mut self, path: &str) -> Self {
            self.failing.insert(path.to_string());
            self
        }
    }

    impl ExistenceOracle for StubOracle {
        fn exists(&self, path: &str) -> Result<bool, ProbeError> {
            if self.failing.contains(path) {
                return Err(ProbeError {
                    path: path.to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "probe denied"),
                });
            }
            Ok(self.existing.contains(path))
        }
    }

    fn map_of(pairs: &[(&str, &str)]) -> RedirectMap {
        let mut map = RedirectMap::new();
        for (source, target) in pairs {
            map.insert(source.to_string(), target.to_string());
        }
        map
    }

    fn chain_strings(result: &ChainResult) -> Vec<&str> {
        result.chain().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_multi_hop_valid_chain() {
        let map = map_of(&[("/a", "/b"), ("/b", "/c")]);
        let oracle = StubOracle::with_paths(&["/c"]);

        let results = resolve_chains(&map, &oracle);
        assert_eq!(results.len(), 1);
        match &results[0] {
            ChainResult::Valid {
                chain,
                target,
                resolved,
            } => {
                assert_eq!(chain, &["/a", "/b", "/c"]);
                assert_eq!(target, "/c");
                assert_eq!(resolved, "/c");
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn test_two_node_cycle() {
        let map = map_of(&[("/a", "/b"), ("/b", "/a")]);
        let oracle = StubOracle::default();

        let results = resolve_chains(&map, &oracle);
        assert_eq!(results.len(), 1);
        match &results[0] {
            ChainResult::Circular { chain } => assert_eq!(chain, &["/a", "/b", "/a"]),
            other => panic!("expected Circular, got {other:?}"),
        }
    }

    #[test]
    fn test_self_redirect_is_circular() {
        let map = map_of(&[("/a", "/a")]);
        let results = resolve_chains(&map, &StubOracle::default());
        assert_eq!(results.len(), 1);
        match &results[0] {
            ChainResult::Circular { chain } => assert_eq!(chain, &["/a", "/a"]),
            other => panic!("expected Circular, got {other:?}"),
        }
    }

    #[test]
    fn test_external_targets() {
        let map = map_of(&[
            ("/a", "https://example.com/x"),
            ("/b", "http://example.com/y"),
            ("/c", "//cdn.example.com/z"),
        ]);
        let results = resolve_chains(&map, &StubOracle::default());
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(matches!(result, ChainResult::External { .. }));
        }
        match &results[0] {
            ChainResult::External { chain, url } => {
                assert_eq!(chain, &["/a"]);
                assert_eq!(url, "https://example.com/x");
            }
            other => panic!("expected External, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_terminal() {
        let map = map_of(&[("/a", "/missing/page")]);
        let results = resolve_chains(&map, &StubOracle::default());
        match &results[0] {
            ChainResult::Missing { chain, target } => {
                assert_eq!(chain, &["/a", "/missing/page"]);
                assert_eq!(target, "/missing/page");
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn test_suffix_placeholder_never_missing() {
        let map = map_of(&[("/old-docs", "/new/$1")]);
        let results = resolve_chains(&map, &StubOracle::default());
        match &results[0] {
            ChainResult::SuffixPreserving { chain, target } => {
                assert_eq!(chain, &["/old-docs", "/new/$1"]);
                assert_eq!(target, "/new/$1");
            }
            other => panic!("expected SuffixPreserving, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_extension_tolerance() {
        // /a.html -> /b, and /b continues through the key /b.html
        let map = map_of(&[("/a.html", "/b"), ("/b.html", "/c")]);
        let oracle = StubOracle::with_paths(&["/c"]);

        let results = resolve_chains(&map, &oracle);
        assert_eq!(results.len(), 1);
        match &results[0] {
            ChainResult::Valid { chain, .. } => assert_eq!(chain, &["/a.html", "/b", "/c"]),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn test_probe_extension_tolerance_stripped() {
        // Terminal /b.html missing, /b exists
        let map = map_of(&[("/a", "/b.html")]);
        let oracle = StubOracle::with_paths(&["/b"]);
        match &resolve_chains(&map, &oracle)[0] {
            ChainResult::Valid { resolved, .. } => assert_eq!(resolved, "/b"),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn test_probe_extension_tolerance_appended() {
        // Terminal /b missing, /b.html exists
        let map = map_of(&[("/a", "/b")]);
        let oracle = StubOracle::with_paths(&["/b.html"]);
        match &resolve_chains(&map, &oracle)[0] {
            ChainResult::Valid { resolved, .. } => assert_eq!(resolved, "/b.html"),
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn test_covered_sources_do_not_restart() {
        // /old -> /mid -> /new -> /final.html; /mid and /new are sources but
        // must not start their own top-level chains.
        let map = map_of(&[("/old", "/mid"), ("/mid", "/new"), ("/new", "/final.html")]);
        let oracle = StubOracle::with_paths(&["/final.html"]);

        let results = resolve_chains(&map, &oracle);
        assert_eq!(results.len(), 1);
        assert_eq!(
            chain_strings(&results[0]),
            ["/old", "/mid", "/new", "/final.html"]
        );
    }

    #[test]
    fn test_every_source_appears_exactly_once() {
        let map = map_of(&[
            ("/a", "/b"),
            ("/b", "/c"),
            ("/d", "/b"),
            ("/e", "https://example.com"),
            ("/f", "/f"),
        ]);
        let oracle = StubOracle::with_paths(&["/c"]);
        let results = resolve_chains(&map, &oracle);

        let mut appearances: std::collections::HashMap<&str, usize> =
            std::collections::HashMap::new();
        for result in &results {
            for hop in result.chain() {
                if map.contains_source(hop) {
                    *appearances.entry(hop.as_str()).or_default() += 1;
                }
            }
        }
        for (source, _) in map.iter() {
            assert_eq!(appearances.get(source), Some(&1), "source {source}");
        }
    }

    #[test]
    fn test_shared_tail_reports_both_sources() {
        // Circularity is chain-local: /b was fully resolved by /a's chain,
        // and /d reaching /b again is not a cycle.
        let map = map_of(&[("/a", "/b"), ("/b", "/c"), ("/d", "/b")]);
        let oracle = StubOracle::with_paths(&["/c"]);

        let results = resolve_chains(&map, &oracle);
        assert_eq!(results.len(), 2);
        assert_eq!(chain_strings(&results[0]), ["/a", "/b", "/c"]);
        assert_eq!(chain_strings(&results[1]), ["/d", "/b", "/c"]);
        assert!(matches!(results[1], ChainResult::Valid { .. }));
    }

    #[test]
    fn test_probe_failure_is_isolated() {
        let map = map_of(&[("/a", "/unreadable"), ("/b", "/fine")]);
        let oracle = StubOracle::with_paths(&["/fine"]).failing_on("/unreadable");

        let results = resolve_chains(&map, &oracle);
        assert_eq!(results.len(), 2);
        match &results[0] {
            ChainResult::Probe(failure) => {
                assert_eq!(failure.target, "/unreadable");
                assert_eq!(failure.chain, ["/a", "/unreadable"]);
            }
            other => panic!("expected Probe, got {other:?}"),
        }
        assert!(matches!(&results[1], ChainResult::Valid { .. }));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let map = map_of(&[("/a", "/b"), ("/b", "/c"), ("/d", "/b"), ("/e", "/gone")]);
        let oracle = StubOracle::with_paths(&["/c"]);

        let results_a = resolve_chains(&map, &oracle);
        let results_b = resolve_chains(&map, &oracle);
        let first: Vec<Vec<&str>> = results_a.iter().map(chain_strings).collect();
        let second: Vec<Vec<&str>> = results_b.iter().map(chain_strings).collect();
        assert_eq!(first, second);
    }
}
