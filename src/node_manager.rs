//! The search-node arena (spec.md §3, §4.3).
//!
//! An append-only pool of [`SearchNode`] records addressed by dense integer
//! index, matching the teacher's arena-by-index style (the transposition
//! table is dense-indexed, not pointer-linked). Every field is atomic so
//! `node(i)` can hand back a shared reference even while other threads are
//! concurrently populating different indices.

use std::sync::atomic::{AtomicI64, AtomicU8, AtomicUsize, Ordering};

/// Which side of its parent a `SearchNode` branches: left commits `value =
/// 0`, right commits `value = 1` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Left,
    Right,
}

impl BranchKind {
    fn as_u8(self) -> u8 {
        match self {
            BranchKind::Left => 0,
            BranchKind::Right => 1,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => BranchKind::Left,
            _ => BranchKind::Right,
        }
    }

    pub fn value(self) -> u8 {
        self.as_u8()
    }
}

/// One node of the binary decision tree. `root == 0` both for the true root
/// (which really is its own parent-of-record, index 0) and, until a node is
/// reserved as a child, for the sentinel "unset" state of `left`/`right` —
/// index 0 is always the root and is never anyone's child, so the two
/// meanings never collide (spec.md §3).
#[derive(Debug, Default)]
pub struct SearchNode {
    index: AtomicUsize,
    value: AtomicU8,
    kind: AtomicU8,
    root: AtomicUsize,
    left: AtomicUsize,
    right: AtomicUsize,
    lower_bound: AtomicI64,
    upper_bound: AtomicI64,
}

impl SearchNode {
    pub fn index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    pub fn set_index(&self, index: usize) {
        self.index.store(index, Ordering::Relaxed);
    }

    pub fn value(&self) -> u8 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn set_value(&self, value: u8) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn kind(&self) -> BranchKind {
        BranchKind::from_u8(self.kind.load(Ordering::Relaxed))
    }

    pub fn set_kind(&self, kind: BranchKind) {
        self.kind.store(kind.as_u8(), Ordering::Relaxed);
    }

    pub fn root(&self) -> usize {
        self.root.load(Ordering::Relaxed)
    }

    pub fn set_root(&self, root: usize) {
        self.root.store(root, Ordering::Relaxed);
    }

    pub fn left(&self) -> usize {
        self.left.load(Ordering::Relaxed)
    }

    pub fn set_left(&self, left: usize) {
        self.left.store(left, Ordering::Relaxed);
    }

    pub fn right(&self) -> usize {
        self.right.load(Ordering::Relaxed)
    }

    pub fn set_right(&self, right: usize) {
        self.right.store(right, Ordering::Relaxed);
    }

    pub fn lower_bound(&self) -> i64 {
        self.lower_bound.load(Ordering::Relaxed)
    }

    pub fn set_lower_bound(&self, v: i64) {
        self.lower_bound.store(v, Ordering::Relaxed);
    }

    pub fn upper_bound(&self) -> i64 {
        self.upper_bound.load(Ordering::Relaxed)
    }

    pub fn set_upper_bound(&self, v: i64) {
        self.upper_bound.store(v, Ordering::Relaxed);
    }

    /// Seed both bounds from the parent's (already-adjusted) window, as
    /// `set_bounds(parent.bounds())` in spec.md §4.6.d.3.
    pub fn set_bounds(&self, lower_bound: i64, upper_bound: i64) {
        self.set_lower_bound(lower_bound);
        self.set_upper_bound(upper_bound);
    }
}

/// Pre-allocated pool of [`SearchNode`]s. `get_next_node`/`reserve_pair` are
/// the only mutators and are both a single atomic fetch-add, so the arena is
/// safe to expand from any number of concurrent workers.
pub struct NodeManager {
    arena: Vec<SearchNode>,
    high_water: AtomicUsize,
}

impl NodeManager {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Vec::with_capacity(capacity);
        arena.resize_with(capacity, SearchNode::default);
        NodeManager {
            arena,
            high_water: AtomicUsize::new(0),
        }
    }

    /// Out-of-range indexing is a programming error (spec.md §4.3); this
    /// panics via slice indexing same as the rest of the engine.
    pub fn node(&self, i: usize) -> &SearchNode {
        &self.arena[i]
    }

    /// Atomically advance the high-water mark by one and return the index
    /// just claimed. Never returns the same index twice.
    pub fn get_next_node(&self) -> usize {
        self.high_water.fetch_add(1, Ordering::Relaxed)
    }

    /// Atomically reserve two consecutive indices. spec.md §9 requires child
    /// pairs to be reserved as a single atomic fetch-and-add of 2 rather than
    /// two independent calls to `get_next_node`, which would be racy under
    /// concurrent expansion.
    pub fn reserve_pair(&self) -> usize {
        self.high_water.fetch_add(2, Ordering::Relaxed)
    }

    /// Total `SearchNode`s ever allocated — equals the high-water mark
    /// (spec.md §8 invariant).
    pub fn allocated(&self) -> usize {
        self.high_water.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.arena.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_next_node_never_repeats() {
        let manager = NodeManager::with_capacity(8);
        let a = manager.get_next_node();
        let b = manager.get_next_node();
        assert_ne!(a, b);
        assert_eq!(manager.allocated(), 2);
    }

    #[test]
    fn reserve_pair_is_consecutive() {
        let manager = NodeManager::with_capacity(8);
        let first = manager.reserve_pair();
        let second = manager.get_next_node();
        assert_eq!(second, first + 2);
    }

    #[test]
    fn bounds_round_trip() {
        let manager = NodeManager::with_capacity(1);
        manager.node(0).set_bounds(3, 9);
        assert_eq!(manager.node(0).lower_bound(), 3);
        assert_eq!(manager.node(0).upper_bound(), 9);
    }
}
