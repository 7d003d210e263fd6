//! Weighted haplotype assembly via parallel branch-and-bound search.
//!
//! A [`Tree`](tree::Tree) holds a set of haplotype positions ([`Node`]s) and
//! their pairwise correlations ([`Link`]s). `explore` runs a branch-and-bound
//! search over the binary decision tree of position assignments, sharing a
//! global upper bound across worker threads via lock-free atomics, and writes
//! the winning `0`/`1` value back onto each position.

pub mod bounder;
pub mod error;
pub mod link;
pub mod node;
pub mod node_manager;
pub mod node_selector;
pub mod sync;
pub mod tree;

pub use error::TreeError;
pub use link::Link;
pub use node::Node;
pub use tree::{ExploreConfig, Tree};
