//! Bound-delta computation, parallel inside (spec.md §4.5).

use crate::link::{Link, LinkContainer};
use crate::node::NodeContainer;
use crate::node_manager::NodeManager;

/// The `(lower, upper)` deltas to apply to a parent's accumulated bounds when
/// committing a given haplotype position (spec.md §4.5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundDelta {
    pub lower: i64,
    pub upper: i64,
}

/// Computes bound deltas for a candidate (haplo-position, search-node) pair.
/// Holds borrowed references to the (read-only, during search) node and link
/// containers, mirroring how spec.md §4.6 constructs it once per `explore`
/// call.
///
/// For each link incident to `haplo_idx`, whether the link's *other* endpoint
/// has already been committed along this search-node's path (found by
/// walking `SearchNode::root` back to the arena root) decides how the link
/// is bounded:
///
/// - other endpoint still undecided: this is the link's first visit. Both
///   bounds move by `min(homo, hetro)` — the cheapest penalty this link can
///   possibly realize, kept identical on both sides so the lower/upper gap
///   never shrinks here (spec.md §8's `lower_bound <= upper_bound` invariant
///   holds unconditionally: the link's true contribution cannot be known
///   until both endpoints are committed, so tightening the upper bound
///   toward `max` before that point would risk excluding a completion that
///   still realizes it).
/// - other endpoint already decided: this is the link's second and final
///   visit, and its true contribution is now exactly known (`hetro_weight`
///   if the two endpoints agree — the heterozygous evidence this decision
///   overrides — `homo_weight` if they don't). Only the lower bound catches
///   up to that exact value; the upper bound is left alone, since it already
///   reserved the link's best-case cost and never overcommitted.
pub struct Bounder<'a> {
    nodes: &'a NodeContainer,
    links: &'a LinkContainer,
}

impl<'a> Bounder<'a> {
    pub fn new(nodes: &'a NodeContainer, links: &'a LinkContainer) -> Self {
        Bounder { nodes, links }
    }

    pub fn calculate(
        &self,
        haplo_idx: usize,
        search_idx: usize,
        manager: &NodeManager,
        bound_threads: usize,
    ) -> BoundDelta {
        #[cfg(feature = "logging")]
        log::trace!(
            "bounder: haplo_idx={haplo_idx} search_idx={search_idx} bound_threads={bound_threads}"
        );

        let _ = self.nodes; // per-node weight does not enter the delta in this model.

        let this_value = manager.node(search_idx).value();
        let pairs: Vec<(&Link, Option<u8>)> = self
            .links
            .incident(haplo_idx)
            .map(|(&(lo, hi), link)| {
                let other = if lo == haplo_idx { hi } else { lo };
                (link, ancestor_value(manager, search_idx, other))
            })
            .collect();
        if pairs.is_empty() {
            return BoundDelta::default();
        }

        let threads = bound_threads.max(1).min(pairs.len());
        if threads <= 1 {
            return reduce(&pairs, this_value);
        }

        let chunk_size = pairs.len().div_ceil(threads);
        let chunks: Vec<&[(&Link, Option<u8>)]> = pairs.chunks(chunk_size).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .into_iter()
                .map(|chunk| scope.spawn(move || reduce(chunk, this_value)))
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().expect("bound worker panicked"))
                .fold(BoundDelta::default(), |acc, delta| BoundDelta {
                    lower: acc.lower + delta.lower,
                    upper: acc.upper + delta.upper,
                })
        })
    }
}

fn reduce(pairs: &[(&Link, Option<u8>)], this_value: u8) -> BoundDelta {
    pairs
        .iter()
        .fold(BoundDelta::default(), |acc, &(link, other)| {
            let best = link.min_value() as i64;
            match other {
                None => BoundDelta {
                    lower: acc.lower + best,
                    upper: acc.upper + best,
                },
                Some(other_value) => {
                    // The penalty a link exacts is the weight of the relationship
                    // it did *not* realize: two positions that end up equal still
                    // "spend" the hetro weight (the disagreement evidence they
                    // overrode), and vice versa. This is what makes a dominant
                    // homo weight pull the search toward agreement.
                    let realized = if other_value == this_value {
                        link.hetro_weight()
                    } else {
                        link.homo_weight()
                    } as i64;
                    BoundDelta {
                        lower: acc.lower + (realized - best),
                        upper: acc.upper,
                    }
                }
            }
        })
}

/// Walk `SearchNode::root` from `start` looking for an ancestor (inclusive of
/// `start` itself) branching `target`. Every decision happens in the same
/// global selector order regardless of path, so this is well-defined: an
/// ancestor is found iff `target` was committed earlier along this exact
/// path than `start`.
fn ancestor_value(manager: &NodeManager, mut cur: usize, target: usize) -> Option<u8> {
    loop {
        if cur == 0 {
            return None;
        }
        let node = manager.node(cur);
        if node.index() == target {
            return Some(node.value());
        }
        cur = node.root();
    }
}
