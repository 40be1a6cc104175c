//! Grouping chain results by final destination.
//!
//! Many sources redirect (directly or transitively) to the same place; the
//! report is organized around those shared destinations rather than around
//! individual table rows.

use rustc_hash::FxHashMap;

use super::resolve::{ChainResult, ProbeFailure};

// ============================================================================
// Group Types
// ============================================================================

/// One originating redirect within a target group
#[derive(Debug, Clone)]
pub struct ChainMember {
    /// The table source the chain started from.
    pub source: String,
    /// Full hop sequence, source first.
    pub chain: Vec<String>,
}

/// All chains that settle on the same final destination
#[derive(Debug, Clone)]
pub struct TargetGroup {
    /// Canonical final target (path, URL, or suffix pattern).
    pub target: String,
    /// For valid groups, the probed path variant that exists.
    pub resolved: Option<String>,
    /// Originating chains, in table order.
    pub members: Vec<ChainMember>,
}

/// Grouped outcome of a full redirect analysis
#[derive(Debug, Default)]
pub struct RedirectAnalysis {
    /// Total number of table entries analyzed.
    pub total: usize,
    /// Chains terminating at an existing output file.
    pub valid: Vec<TargetGroup>,
    /// Chains terminating at an external URL.
    pub external: Vec<TargetGroup>,
    /// Chains terminating at a path absent from the output.
    pub missing: Vec<TargetGroup>,
    /// Chains terminating at a suffix-preserving pattern.
    pub suffix_preserving: Vec<TargetGroup>,
    /// Cyclic chains, in discovery order (rarely shared, never grouped).
    pub circular: Vec<Vec<String>>,
    /// Chains whose terminal probe failed, in discovery order.
    pub probe_failures: Vec<ProbeFailure>,
}

impl RedirectAnalysis {
    /// Group classified chains by final destination.
    ///
    /// Groups are sorted by descending member count, ties broken by target
    /// string, so identical inputs always render identically.
    pub fn from_chains(total: usize, chains: Vec<ChainResult>) -> Self {
        let mut valid = GroupAccumulator::default();
        let mut external = GroupAccumulator::default();
        let mut missing = GroupAccumulator::default();
        let mut suffix_preserving = GroupAccumulator::default();
        let mut circular = Vec::new();
        let mut probe_failures = Vec::new();

        for result in chains {
            match result {
                ChainResult::Valid {
                    chain,
                    target,
                    resolved,
                } => valid.push(target, Some(resolved), ChainMember::from_chain(chain)),
                ChainResult::External { chain, url } => {
                    external.push(url, None, ChainMember::from_chain(chain));
                }
                ChainResult::Missing { chain, target } => {
                    missing.push(target, None, ChainMember::from_chain(chain));
                }
                ChainResult::SuffixPreserving { chain, target } => {
                    suffix_preserving.push(target, None, ChainMember::from_chain(chain));
                }
                ChainResult::Circular { chain } => circular.push(chain),
                ChainResult::Probe(failure) => probe_failures.push(failure),
            }
        }

        Self {
            total,
            valid: valid.finish(),
            external: external.finish(),
            missing: missing.finish(),
            suffix_preserving: suffix_preserving.finish(),
            circular,
            probe_failures,
        }
    }

    /// Chains that resolved to an existing file.
    pub fn valid_chain_count(&self) -> usize {
        member_count(&self.valid)
    }

    /// Chains that left the site.
    pub fn external_chain_count(&self) -> usize {
        member_count(&self.external)
    }

    /// Chains pointing at nothing.
    pub fn missing_chain_count(&self) -> usize {
        member_count(&self.missing)
    }

    /// Chains ending in a suffix-preserving pattern.
    pub fn suffix_chain_count(&self) -> usize {
        member_count(&self.suffix_preserving)
    }

    /// Whether anything needs fixing (missing, circular, or unanswerable).
    pub fn has_problems(&self) -> bool {
        !self.missing.is_empty() || !self.circular.is_empty() || !self.probe_failures.is_empty()
    }
}

impl ChainMember {
    fn from_chain(chain: Vec<String>) -> Self {
        Self {
            source: chain[0].clone(),
            chain,
        }
    }
}

fn member_count(groups: &[TargetGroup]) -> usize {
    groups.iter().map(|g| g.members.len()).sum()
}

// ============================================================================
// Accumulator
// ============================================================================

/// Builds target groups in first-seen order, then sorts for the report.
#[derive(Default)]
struct GroupAccumulator {
    groups: Vec<TargetGroup>,
    index: FxHashMap<String, usize>,
}

impl GroupAccumulator {
    fn push(&mut self, target: String, resolved: Option<String>, member: ChainMember) {
        let slot = match self.index.get(&target) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(target.clone(), slot);
                self.groups.push(TargetGroup {
                    target,
                    resolved: None,
                    members: Vec::new(),
                });
                slot
            }
        };

        let group = &mut self.groups[slot];
        if group.resolved.is_none() {
            group.resolved = resolved;
        }
        group.members.push(member);
    }

    fn finish(mut self) -> Vec<TargetGroup> {
        self.groups.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then_with(|| a.target.cmp(&b.target))
        });
        self.groups
    }
}

// ============================================================================
// Tests
// ============================================================================
