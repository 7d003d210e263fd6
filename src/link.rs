//! Pairwise link records and their sparse container (spec.md §3, §4.2).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TreeError;

/// A pairwise correlation between two haplotype positions. Both weights are
/// atomic: they are only ever mutated during load (spec.md §3), but the
/// container hands out shared `&Link` references to concurrent search
/// workers, so interior mutability keeps the accessors lock-free.
#[derive(Debug, Default)]
pub struct Link {
    homo_weight: AtomicU64,
    hetro_weight: AtomicU64,
}

impl Link {
    pub fn new(homo_weight: u64, hetro_weight: u64) -> Self {
        Link {
            homo_weight: AtomicU64::new(homo_weight),
            hetro_weight: AtomicU64::new(hetro_weight),
        }
    }

    pub fn homo_weight(&self) -> u64 {
        self.homo_weight.load(Ordering::Relaxed)
    }

    pub fn hetro_weight(&self) -> u64 {
        self.hetro_weight.load(Ordering::Relaxed)
    }

    pub fn add_homo(&self, delta: u64) {
        self.homo_weight.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn add_hetro(&self, delta: u64) {
        self.hetro_weight.fetch_add(delta, Ordering::Relaxed);
    }

    /// max(homo, hetro) — the "slack" recoverable once the pair is decided.
    pub fn value(&self) -> u64 {
        self.homo_weight().max(self.hetro_weight())
    }

    /// min(homo, hetro) — the penalty forced regardless of decision.
    pub fn min_value(&self) -> u64 {
        self.homo_weight().min(self.hetro_weight())
    }
}

fn ordered_key(l: usize, u: usize) -> Option<(usize, usize)> {
    if l < u {
        Some((l, u))
    } else if u < l {
        Some((u, l))
    } else {
        None
    }
}

/// Sparse mapping from an ordered `(lower_idx, upper_idx)` pair to a [`Link`].
/// Built once during load; read-only (beyond the atomic weight bumps above)
/// during search — "no structural mutation occurs" (spec.md §4.2).
#[derive(Debug, Default)]
pub struct LinkContainer {
    links: HashMap<(usize, usize), Link>,
    incident: HashMap<usize, Vec<(usize, usize)>>,
}

impl LinkContainer {
    pub fn new() -> Self {
        LinkContainer {
            links: HashMap::new(),
            incident: HashMap::new(),
        }
    }

    /// Idempotent: creating the same pair twice returns the existing `Link`
    /// rather than duplicating it.
    pub fn insert(&mut self, l: usize, u: usize) -> Result<&Link, TreeError> {
        let key = ordered_key(l, u).ok_or(TreeError::DegenerateLinkKey { lower: l, upper: u })?;
        if let std::collections::hash_map::Entry::Vacant(e) = self.links.entry(key) {
            e.insert(Link::default());
            self.incident.entry(key.0).or_default().push(key);
            self.incident.entry(key.1).or_default().push(key);
        }
        Ok(self.links.get(&key).expect("just inserted"))
    }

    pub fn exists(&self, l: usize, u: usize) -> bool {
        match ordered_key(l, u) {
            Some(key) => self.links.contains_key(&key),
            None => false,
        }
    }

    /// Caller error to invoke on a missing pair; only ever called after
    /// `exists` in the engine (spec.md §4.2).
    pub fn at(&self, l: usize, u: usize) -> &Link {
        let key = ordered_key(l, u).expect("degenerate link key");
        self.links.get(&key).expect("at() on missing link")
    }

    pub fn link_max(&self, l: usize, u: usize) -> u64 {
        match ordered_key(l, u) {
            Some(key) => self.links.get(&key).map(Link::value).unwrap_or(0),
            None => 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &Link)> {
        self.links.iter()
    }

    /// All links touching `idx`, for the Bounder's per-position sums. Yields
    /// each link's key alongside it so callers can recover the other
    /// endpoint in O(1) instead of scanning the map.
    pub fn incident(&self, idx: usize) -> impl Iterator<Item = (&(usize, usize), &Link)> + '_ {
        self.incident
            .get(&idx)
            .into_iter()
            .flatten()
            .map(move |key| {
                (
                    key,
                    self.links.get(key).expect("incident key always present"),
                )
            })
    }
}
