//! Chooses which haplotype position to branch on next (spec.md §4.4).

use crate::link::LinkContainer;
use crate::node::NodeContainer;

/// Precomputed, deterministic branching order. `start_node` always comes
/// first (it is the position the root/its two seeded children already
/// branch — spec.md §4.6 seeds them before any `select_node` call, so the
/// first call must hand back that same position); the rest are ordered by
/// descending static priority (node weight plus the sum of its incident
/// link values), ties broken by ascending node index (spec.md §4.4).
pub struct NodeSelector {
    order: Vec<usize>,
    cursor: usize,
}

impl NodeSelector {
    pub fn new(nodes: &NodeContainer, links: &LinkContainer, start_node: usize) -> Self {
        let mut rest: Vec<usize> = (0..nodes.num_nodes())
            .filter(|&i| i != start_node)
            .collect();
        rest.sort_by(|&a, &b| {
            let priority_a = priority(nodes, links, a);
            let priority_b = priority(nodes, links, b);
            priority_b.cmp(&priority_a).then(a.cmp(&b))
        });

        let mut order = Vec::with_capacity(nodes.num_nodes());
        if nodes.num_nodes() > 0 {
            order.push(start_node);
        }
        order.extend(rest);

        NodeSelector { order, cursor: 0 }
    }

    /// Returns the next position to branch. Sequential, one call per
    /// recursion level (spec.md §4.4); calling past exhaustion is a
    /// programming error, since the driver must stop recursing once
    /// `last_search_index()` is reached.
    pub fn select_node(&mut self) -> usize {
        let idx = self.order[self.cursor];
        self.cursor += 1;
        idx
    }

    /// The position selected last in the precomputed order — the recursion's
    /// terminal condition (spec.md §4.4).
    pub fn last_search_index(&self) -> usize {
        *self
            .order
            .last()
            .expect("selector built on an empty node container")
    }
}

fn priority(nodes: &NodeContainer, links: &LinkContainer, idx: usize) -> u64 {
    let incident_sum: u64 = links.incident(idx).map(|(_, link)| link.value()).sum();
    nodes.weight(idx).saturating_add(incident_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_selection_is_start_node() {
        let mut nodes = NodeContainer::new();
        nodes.resize(3);
        let links = LinkContainer::new();
        let mut selector = NodeSelector::new(&nodes, &links, 1);
        assert_eq!(selector.select_node(), 1);
    }

    #[test]
    fn higher_weight_is_selected_before_lower() {
        let mut nodes = NodeContainer::new();
        nodes.resize(3);
        nodes.at(1).set_weight(10);
        nodes.at(2).set_weight(1);
        let links = LinkContainer::new();
        let mut selector = NodeSelector::new(&nodes, &links, 0);
        assert_eq!(selector.select_node(), 0);
        assert_eq!(selector.select_node(), 1);
        assert_eq!(selector.select_node(), 2);
    }

    #[test]
    fn ties_break_on_lower_index() {
        let mut nodes = NodeContainer::new();
        nodes.resize(3);
        let links = LinkContainer::new();
        let mut selector = NodeSelector::new(&nodes, &links, 2);
        assert_eq!(selector.select_node(), 2);
        assert_eq!(selector.select_node(), 0);
        assert_eq!(selector.select_node(), 1);
    }

    #[test]
    fn last_search_index_matches_final_order_element() {
        let mut nodes = NodeContainer::new();
        nodes.resize(4);
        let links = LinkContainer::new();
        let mut selector = NodeSelector::new(&nodes, &links, 0);
        let mut last = selector.select_node();
        for _ in 1..4 {
            last = selector.select_node();
        }
        assert_eq!(last, selector.last_search_index());
    }

    #[test]
    fn single_node_selects_start_node_only() {
        let mut nodes = NodeContainer::new();
        nodes.resize(1);
        let links = LinkContainer::new();
        let mut selector = NodeSelector::new(&nodes, &links, 0);
        assert_eq!(selector.select_node(), 0);
        assert_eq!(selector.last_search_index(), 0);
    }
}
