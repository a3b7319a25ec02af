use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Vec2, vec2};

use crate::data::{EdgeDirection, EdgeRecord};

mod view;

/// One aggregated node per filter: a snapshot of the filter's current inner
/// node/edge sets, the filter's marking color, and a stable ring position
/// assigned at creation (unrelated to any feature scaling).
pub struct GroupedNode {
    pub index: usize,
    pub node_ids: HashSet<String>,
    pub edge_slots: Vec<usize>,
    pub color: Color32,
    pub pos: Vec2,
}

/// Synthesized overview edge. Derived state only: always recomputable from
/// the two grouped nodes' snapshots, updated in place so incremental
/// rendering can diff against a stable entry.
pub struct AggregateEdge {
    pub count: usize,
    pub weight: f32,
}

pub struct OverView {
    pub grouped: Vec<GroupedNode>,
    aggregate: HashMap<(usize, usize), AggregateEdge>,
    created: usize,
    pub pan: Vec2,
    pub zoom: f32,
}

// Golden-angle steps keep ring slots distinct for any creation count.
const RING_ANGLE_STEP: f32 = 2.399_963;
const RING_RADIUS: f32 = 170.0;

fn ring_position(slot: usize) -> Vec2 {
    let angle = slot as f32 * RING_ANGLE_STEP;
    vec2(250.0 + RING_RADIUS * angle.cos(), 250.0 + RING_RADIUS * angle.sin())
}

fn aggregate_weight(count: usize) -> f32 {
    // Compresses high counts so edge thickness does not dominate the view.
    count as f32 / 100.0 + 1.0
}

impl OverView {
    pub fn new() -> Self {
        Self {
            grouped: Vec::new(),
            aggregate: HashMap::new(),
            created: 0,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Creates the grouped node for a newly added filter. Must happen before
    /// the repartition pushes node/edge sets for that filter index.
    pub fn add_node(&mut self, color: Color32) {
        let pos = ring_position(self.created);
        self.created += 1;
        self.grouped.push(GroupedNode {
            index: self.grouped.len(),
            node_ids: HashSet::new(),
            edge_slots: Vec::new(),
            color,
            pos,
        });
    }

    pub fn set_node_color(&mut self, idx: usize, color: Color32) {
        if let Some(node) = self.grouped.get_mut(idx) {
            node.color = color;
        }
    }

    /// Replaces one grouped node's snapshots and refreshes every aggregate
    /// edge involving it, in both directions, self-pair included. Entries
    /// whose recomputed crossing count reaches zero are removed entirely.
    pub fn update_node_edges(
        &mut self,
        idx: usize,
        node_ids: HashSet<String>,
        edge_slots: Vec<usize>,
        edges: &[EdgeRecord],
        direction: EdgeDirection,
    ) {
        debug_assert!(idx < self.grouped.len(), "grouped node index {idx} out of range");
        let Some(node) = self.grouped.get_mut(idx) else {
            return;
        };
        node.node_ids = node_ids;
        node.edge_slots = edge_slots;

        for other in 0..self.grouped.len() {
            self.refresh_pair(idx, other, edges, direction);
            if other != idx {
                self.refresh_pair(other, idx, edges, direction);
            }
        }
    }

    /// Removes the grouped node for a deleted filter, renumbers the rest
    /// densely and rebuilds the aggregate map from the surviving snapshots.
    pub fn remove_node(&mut self, idx: usize, edges: &[EdgeRecord], direction: EdgeDirection) {
        debug_assert!(idx < self.grouped.len(), "grouped node index {idx} out of range");
        if idx >= self.grouped.len() {
            return;
        }

        self.grouped.remove(idx);
        for (position, node) in self.grouped.iter_mut().enumerate() {
            node.index = position;
        }
        self.rebuild_aggregate(edges, direction);
    }

    /// Swaps two grouped nodes alongside a filter reorder. Colors and ring
    /// positions travel with the filter; only the priority indices change.
    pub fn swap_nodes(&mut self, a: usize, b: usize, edges: &[EdgeRecord], direction: EdgeDirection) {
        if a >= self.grouped.len() || b >= self.grouped.len() {
            return;
        }

        self.grouped.swap(a, b);
        for (position, node) in self.grouped.iter_mut().enumerate() {
            node.index = position;
        }
        self.rebuild_aggregate(edges, direction);
    }

    pub fn aggregate_edge(&self, from: usize, to: usize) -> Option<&AggregateEdge> {
        self.aggregate.get(&(from, to))
    }

    pub fn aggregate_edges(&self) -> impl Iterator<Item = ((usize, usize), &AggregateEdge)> {
        self.aggregate.iter().map(|(key, edge)| (*key, edge))
    }

    fn refresh_pair(&mut self, from: usize, to: usize, edges: &[EdgeRecord], direction: EdgeDirection) {
        let count = self.crossing_count(from, to, edges, direction);
        if count == 0 {
            self.aggregate.remove(&(from, to));
            return;
        }

        self.aggregate
            .entry((from, to))
            .and_modify(|aggregate| {
                aggregate.count = count;
                aggregate.weight = aggregate_weight(count);
            })
            .or_insert_with(|| AggregateEdge {
                count,
                weight: aggregate_weight(count),
            });
    }

    /// Count of edges in `from`'s inner edge set whose far endpoint belongs
    /// to `to`'s inner node set.
    fn crossing_count(
        &self,
        from: usize,
        to: usize,
        edges: &[EdgeRecord],
        direction: EdgeDirection,
    ) -> usize {
        let source = &self.grouped[from];
        let destination = &self.grouped[to];

        source
            .edge_slots
            .iter()
            .filter(|&&slot| destination.node_ids.contains(direction.far(&edges[slot])))
            .count()
    }

    fn rebuild_aggregate(&mut self, edges: &[EdgeRecord], direction: EdgeDirection) {
        self.aggregate.clear();
        for from in 0..self.grouped.len() {
            for to in 0..self.grouped.len() {
                let count = self.crossing_count(from, to, edges, direction);
                if count > 0 {
                    self.aggregate.insert(
                        (from, to),
                        AggregateEdge {
                            count,
                            weight: aggregate_weight(count),
                        },
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DEFAULT_EDGE_COLOR, FeatureMap};
    use crate::filter::pool_color;

    fn edge(id: &str, source: &str, target: &str) -> EdgeRecord {
        EdgeRecord {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            features: FeatureMap::new(),
            hidden: false,
            color: DEFAULT_EDGE_COLOR,
        }
    }

    fn ids(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn crossing_edges_appear_with_correct_count() {
        let edges = vec![
            edge("e0", "a", "x"),
            edge("e1", "a", "y"),
            edge("e2", "b", "z"),
        ];
        let mut over = OverView::new();
        over.add_node(pool_color(0));
        over.add_node(pool_color(1));

        over.update_node_edges(0, ids(&["a", "b"]), vec![0, 1, 2], &edges, EdgeDirection::Outgoing);
        over.update_node_edges(1, ids(&["x", "y"]), Vec::new(), &edges, EdgeDirection::Outgoing);

        let aggregate = over.aggregate_edge(0, 1).expect("crossing edge exists");
        assert_eq!(aggregate.count, 2);
        assert!((aggregate.weight - 1.02).abs() < 1e-6);
        assert!(over.aggregate_edge(1, 0).is_none());
    }

    #[test]
    fn zero_count_prunes_the_aggregate_edge() {
        let edges = vec![edge("e0", "a", "x")];
        let mut over = OverView::new();
        over.add_node(pool_color(0));
        over.add_node(pool_color(1));

        over.update_node_edges(0, ids(&["a"]), vec![0], &edges, EdgeDirection::Outgoing);
        over.update_node_edges(1, ids(&["x"]), Vec::new(), &edges, EdgeDirection::Outgoing);
        assert_eq!(over.aggregate_edge(0, 1).map(|a| a.count), Some(1));

        // Shrinking the destination set drops the crossing count to zero;
        // the entry must disappear, not linger at weight 1.0.
        over.update_node_edges(1, ids(&["y"]), Vec::new(), &edges, EdgeDirection::Outgoing);
        assert!(over.aggregate_edge(0, 1).is_none());
    }

    #[test]
    fn updates_preserve_entry_rather_than_recreate() {
        let edges = vec![edge("e0", "a", "x"), edge("e1", "b", "x")];
        let mut over = OverView::new();
        over.add_node(pool_color(0));
        over.add_node(pool_color(1));

        over.update_node_edges(0, ids(&["a"]), vec![0], &edges, EdgeDirection::Outgoing);
        over.update_node_edges(1, ids(&["x"]), Vec::new(), &edges, EdgeDirection::Outgoing);
        assert_eq!(over.aggregate_edge(0, 1).map(|a| a.count), Some(1));

        over.update_node_edges(0, ids(&["a", "b"]), vec![0, 1], &edges, EdgeDirection::Outgoing);
        assert_eq!(over.aggregate_edge(0, 1).map(|a| a.count), Some(2));
        assert_eq!(over.aggregate_edges().count(), 1);
    }

    #[test]
    fn self_pair_is_tracked_directed() {
        let edges = vec![edge("e0", "a", "b")];
        let mut over = OverView::new();
        over.add_node(pool_color(0));

        over.update_node_edges(0, ids(&["a", "b"]), vec![0], &edges, EdgeDirection::Outgoing);
        assert_eq!(over.aggregate_edge(0, 0).map(|a| a.count), Some(1));
    }

    #[test]
    fn incoming_direction_counts_by_source_endpoint() {
        let edges = vec![edge("e0", "x", "a")];
        let mut over = OverView::new();
        over.add_node(pool_color(0));
        over.add_node(pool_color(1));

        // Under incoming indexing, a's inner edge e0 crosses toward the
        // grouped node holding its source x.
        over.update_node_edges(0, ids(&["a"]), vec![0], &edges, EdgeDirection::Incoming);
        over.update_node_edges(1, ids(&["x"]), Vec::new(), &edges, EdgeDirection::Incoming);
        assert_eq!(over.aggregate_edge(0, 1).map(|a| a.count), Some(1));
    }

    #[test]
    fn remove_node_renumbers_and_rebuilds() {
        let edges = vec![edge("e0", "a", "x"), edge("e1", "p", "q")];
        let mut over = OverView::new();
        over.add_node(pool_color(0));
        over.add_node(pool_color(1));
        over.add_node(pool_color(2));

        over.update_node_edges(0, ids(&["a"]), vec![0], &edges, EdgeDirection::Outgoing);
        over.update_node_edges(1, ids(&["x"]), Vec::new(), &edges, EdgeDirection::Outgoing);
        over.update_node_edges(2, ids(&["p", "q"]), vec![1], &edges, EdgeDirection::Outgoing);
        assert_eq!(over.aggregate_edge(0, 1).map(|a| a.count), Some(1));
        assert_eq!(over.aggregate_edge(2, 2).map(|a| a.count), Some(1));

        let color_before = over.grouped[2].color;
        over.remove_node(0, &edges, EdgeDirection::Outgoing);

        assert_eq!(over.grouped.len(), 2);
        assert_eq!(over.grouped[1].index, 1);
        assert_eq!(over.grouped[1].color, color_before);
        // The survivor pair (formerly 2->2) now lives at index 1.
        assert_eq!(over.aggregate_edge(1, 1).map(|a| a.count), Some(1));
        assert!(over.aggregate_edge(0, 1).is_none());
    }

    #[test]
    fn swap_keeps_colors_with_their_filters() {
        let mut over = OverView::new();
        over.add_node(pool_color(0));
        over.add_node(pool_color(1));

        over.swap_nodes(0, 1, &[], EdgeDirection::Outgoing);
        assert_eq!(over.grouped[0].color, pool_color(1));
        assert_eq!(over.grouped[1].color, pool_color(0));
        assert_eq!(over.grouped[0].index, 0);
    }
}
