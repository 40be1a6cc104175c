//! Redirect chain analysis.
//!
//! Resolves every entry of a redirect table through successive lookups until
//! the chain terminates at an on-disk file, an external URL, a missing
//! target, or a cycle, then groups the outcomes by final destination for
//! reporting.
//!
//! # Module Structure
//!
//! ```text
//! redirect/
//! ├── map      # RedirectMap loading and extension-tolerant lookup
//! ├── oracle   # ExistenceOracle trait + output-directory implementation
//! ├── resolve  # chain walking and classification
//! ├── group    # grouping by final destination
//! └── report   # console + HTML rendering
//! ```

pub mod group;
pub mod map;
pub mod oracle;
pub mod report;
pub mod resolve;

pub use group::{ChainMember, RedirectAnalysis, TargetGroup};
pub use map::{MapError, RedirectMap};
pub use oracle::{ExistenceOracle, OutputDirOracle, ProbeError};
pub use resolve::{ChainResult, ProbeFailure, resolve_chains};

/// Resolve all redirect chains and group them by final destination.
pub fn resolve(map: &RedirectMap, oracle: &dyn ExistenceOracle) -> RedirectAnalysis {
    RedirectAnalysis::from_chains(map.len(), resolve_chains(map, oracle))
}
