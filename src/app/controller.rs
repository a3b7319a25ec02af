use std::collections::HashSet;

use eframe::egui::Color32;

use crate::data::{DataSet, EdgeDirection, EdgeIndex};
use crate::filter::{Boundary, Filter, partition_edges, partition_nodes, pool_color};

use super::detail::DetailView;
use super::overview::OverView;

/// Single owner of the filter list and the node/edge universe. Views never
/// mutate either directly; every change funnels through a method here and
/// ends in a full repartition. A Controller only exists for a completely
/// loaded universe (constructed in the Loading -> Ready transition), so no
/// filter operation can ever observe a half-ingested dataset.
pub struct Controller {
    pub graph: DataSet,
    filters: Vec<Filter>,
    pub direction: EdgeDirection,
    edge_index: EdgeIndex,
    pub detail: DetailView,
    pub over: OverView,
}

impl Controller {
    pub fn new(
        graph: DataSet,
        x_axis: String,
        y_axis: String,
        direction: EdgeDirection,
    ) -> Self {
        let edge_index = EdgeIndex::build(&graph.edges, direction);
        let mut controller = Self {
            graph,
            filters: Vec::new(),
            direction,
            edge_index,
            detail: DetailView::new(x_axis, y_axis),
            over: OverView::new(),
        };
        controller.detail.rescale_positions(&mut controller.graph);
        controller
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn filter(&self, idx: usize) -> Option<&Filter> {
        self.filters.get(idx)
    }

    /// Ordered marking colors, for mapping partition bucket index to color
    /// without re-deriving it.
    pub fn filter_colors(&self) -> Vec<Color32> {
        self.filters.iter().map(|filter| filter.color).collect()
    }

    /// The marking color the next created filter will receive.
    pub fn next_color(&self) -> Color32 {
        pool_color(self.filters.len())
    }

    /// Appends a filter at the end of the priority order. The overview gets
    /// its grouped node first so the repartition below has somewhere to push
    /// the new filter's node/edge sets.
    pub fn add_filter(&mut self, filter: Filter) {
        log::debug!("add filter at position {}", self.filters.len());

        let color = filter.color;
        self.filters.push(filter);
        self.detail.push_selection_box();
        self.over.add_node(color);

        let idx = self.filters.len() - 1;
        self.detail.recalc_selection_box(idx, &self.filters[idx]);
        self.recalc_boxes();
    }

    /// Replaces one feature's boundary on one filter and repartitions. The
    /// boundary lands on the node level, the edge level, or both, depending
    /// on which feature catalogs carry the feature: copying a node-axis
    /// constraint onto the edge map would exclude every edge lacking that
    /// feature under the strict missing-feature rule. `update_selections`
    /// suppresses the write-back into the detail rectangle when the
    /// rectangle itself originated the edit, which would otherwise loop the
    /// resize handler forever.
    pub fn update_filter(
        &mut self,
        idx: usize,
        feature: &str,
        boundary: Boundary,
        update_selections: bool,
    ) {
        debug_assert!(idx < self.filters.len(), "filter index {idx} out of range");
        let on_edges = self.graph.edge_features.iter().any(|key| key == feature);
        let on_nodes = self.graph.node_features.iter().any(|key| key == feature);
        let Some(filter) = self.filters.get_mut(idx) else {
            return;
        };

        if on_nodes || !on_edges {
            filter.set_node_boundary(feature, boundary);
        }
        if on_edges {
            filter.set_edge_boundary(feature, boundary);
        }

        if update_selections {
            self.detail.recalc_selection_box(idx, &self.filters[idx]);
        }
        self.recalc_boxes();
    }

    pub fn update_filter_color(&mut self, idx: usize, color: Color32) {
        debug_assert!(idx < self.filters.len(), "filter index {idx} out of range");
        let Some(filter) = self.filters.get_mut(idx) else {
            return;
        };

        filter.color = color;
        self.over.set_node_color(idx, color);
        self.recalc_boxes();
    }

    /// Swaps a filter with its neighbor. Boundaries are untouched but the
    /// priority order changes, so the partition must be recomputed. Returns
    /// the filter's new index (the original one when the move is illegal).
    pub fn move_filter(&mut self, idx: usize, is_upwards: bool) -> usize {
        debug_assert!(idx < self.filters.len(), "filter index {idx} out of range");
        if idx >= self.filters.len() {
            return idx;
        }

        let new_idx = if is_upwards {
            let Some(new_idx) = idx.checked_sub(1) else {
                return idx;
            };
            new_idx
        } else {
            let new_idx = idx + 1;
            if new_idx >= self.filters.len() {
                return idx;
            }
            new_idx
        };

        self.filters.swap(idx, new_idx);
        self.detail.swap_selection_boxes(idx, new_idx);
        self.over.swap_nodes(idx, new_idx, &self.graph.edges, self.direction);
        self.recalc_boxes();

        new_idx
    }

    /// Deletes a filter; remaining indices close the gap. Colors stay with
    /// their filters, so removal never recolors the survivors.
    pub fn remove_filter(&mut self, idx: usize) {
        debug_assert!(idx < self.filters.len(), "filter index {idx} out of range");
        if idx >= self.filters.len() {
            return;
        }

        log::debug!("remove filter at position {idx}");
        self.filters.remove(idx);
        self.detail.remove_selection_box(idx);
        self.over.remove_node(idx, &self.graph.edges, self.direction);
        self.recalc_boxes();
    }

    /// Switches the active display axes: node positions and every selection
    /// rectangle are re-derived, then the partition refreshes the coloring.
    pub fn set_axes(&mut self, x_axis: String, y_axis: String) {
        self.detail.set_axes(&mut self.graph, x_axis, y_axis);
        for idx in 0..self.filters.len() {
            self.detail.recalc_selection_box(idx, &self.filters[idx]);
        }
        self.recalc_boxes();
    }

    /// Rekeys the incident-edge index by the other endpoint. Changes what
    /// "incident" means for edge partitioning and overview aggregation.
    pub fn set_edge_direction(&mut self, direction: EdgeDirection) {
        if self.direction == direction {
            return;
        }

        log::debug!("switching edge direction to {}", direction.label());
        self.direction = direction;
        self.edge_index = EdgeIndex::build(&self.graph.edges, direction);
        self.recalc_boxes();
    }

    /// The repartition entry point. Every state-changing operation above
    /// ends here: partitions nodes and edges over the whole universe,
    /// recolors the detail view and pushes each filter's current node/edge
    /// sets to the overview.
    pub fn recalc_boxes(&mut self) {
        let node_partition = partition_nodes(&self.graph.nodes, &self.filters);
        let edge_partition = partition_edges(
            &node_partition,
            &self.graph.nodes,
            &self.graph.edges,
            &self.edge_index,
            &self.filters,
        );

        let colors = self.filter_colors();
        self.detail
            .recalc_coloring(&mut self.graph, &node_partition, &edge_partition, &colors);

        for idx in 0..self.filters.len() {
            let node_ids = node_partition.mapped[idx]
                .iter()
                .map(|&slot| self.graph.nodes[slot].id.clone())
                .collect::<HashSet<_>>();
            self.over.update_node_edges(
                idx,
                node_ids,
                edge_partition.mapped[idx].clone(),
                &self.graph.edges,
                self.direction,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR, EdgeRecord, FeatureMap, NodeRecord};

    fn node(id: &str, x: f64, y: f64) -> NodeRecord {
        let mut features = FeatureMap::new();
        features.insert("X".to_owned(), x);
        features.insert("Y".to_owned(), y);
        NodeRecord {
            id: id.to_owned(),
            features,
            x: 0.0,
            y: 0.0,
            color: DEFAULT_NODE_COLOR,
        }
    }

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

    fn controller() -> Controller {
        let graph = DataSet::new(
            vec![
                node("a", 10.0, 10.0),
                node("b", 45.0, 45.0),
                node("c", 70.0, 70.0),
                node("d", 200.0, 200.0),
            ],
            vec![edge("e0", "a", "b"), edge("e1", "b", "c"), edge("e2", "c", "d")],
        );
        Controller::new(graph, "X".to_owned(), "Y".to_owned(), EdgeDirection::Outgoing)
    }

    fn span_filter(min: f64, max: f64, color: Color32) -> Filter {
        Filter::new(
            &[
                ("X", Boundary { min, max }),
                ("Y", Boundary { min, max }),
            ],
            color,
        )
    }

    #[test]
    fn overlapping_filters_color_by_priority() {
        let mut controller = controller();
        controller.add_filter(span_filter(0.0, 50.0, pool_color(0)));
        controller.add_filter(span_filter(40.0, 100.0, pool_color(1)));

        // b sits in both boxes; the earlier filter wins.
        assert_eq!(controller.graph.node_by_id("b").unwrap().color, pool_color(0));
        assert_eq!(controller.graph.node_by_id("c").unwrap().color, pool_color(1));
        assert_eq!(
            controller.graph.node_by_id("d").unwrap().color,
            DEFAULT_NODE_COLOR
        );
    }

    #[test]
    fn removal_keeps_survivor_colors() {
        let mut controller = controller();
        for _ in 0..3 {
            let color = controller.next_color();
            controller.add_filter(span_filter(-1.0, -0.5, color));
        }
        assert_eq!(controller.filter_colors(), vec![pool_color(0), pool_color(1), pool_color(2)]);

        controller.remove_filter(0);

        // Colors persist with the filter, they are not re-derived from the
        // new dense indices.
        assert_eq!(controller.filter_colors(), vec![pool_color(1), pool_color(2)]);
        assert_eq!(controller.filter_count(), 2);
    }

    #[test]
    fn move_filter_swaps_priority_and_recolors() {
        let mut controller = controller();
        controller.add_filter(span_filter(0.0, 50.0, pool_color(0)));
        controller.add_filter(span_filter(40.0, 100.0, pool_color(1)));
        assert_eq!(controller.graph.node_by_id("b").unwrap().color, pool_color(0));

        let new_idx = controller.move_filter(0, false);
        assert_eq!(new_idx, 1);

        // The overlap now resolves to the other filter first.
        assert_eq!(controller.graph.node_by_id("b").unwrap().color, pool_color(1));
        assert_eq!(controller.filter_colors(), vec![pool_color(1), pool_color(0)]);
    }

    #[test]
    fn illegal_moves_are_no_ops() {
        let mut controller = controller();
        controller.add_filter(span_filter(0.0, 50.0, pool_color(0)));

        assert_eq!(controller.move_filter(0, true), 0);
        assert_eq!(controller.move_filter(0, false), 0);
    }

    #[test]
    fn repartition_feeds_the_overview() {
        let mut controller = controller();
        controller.add_filter(span_filter(0.0, 50.0, pool_color(0)));
        controller.add_filter(span_filter(60.0, 100.0, pool_color(1)));

        // a,b in filter 0; c in filter 1; e1 (b->c) crosses between them.
        assert_eq!(controller.over.grouped[0].node_ids.len(), 2);
        assert_eq!(controller.over.grouped[1].node_ids.len(), 1);
        assert_eq!(controller.over.aggregate_edge(0, 1).map(|a| a.count), Some(1));
        // e0 (a->b) stays inside filter 0.
        assert_eq!(controller.over.aggregate_edge(0, 0).map(|a| a.count), Some(1));
    }

    #[test]
    fn shrinking_a_filter_prunes_stale_aggregates() {
        let mut controller = controller();
        controller.add_filter(span_filter(0.0, 50.0, pool_color(0)));
        controller.add_filter(span_filter(60.0, 100.0, pool_color(1)));
        assert_eq!(controller.over.aggregate_edge(0, 1).map(|a| a.count), Some(1));

        // Shrink filter 1 until c no longer matches: the crossing aggregate
        // must disappear.
        controller.update_filter(1, "X", Boundary { min: 60.0, max: 65.0 }, true);
        assert_eq!(controller.over.aggregate_edge(0, 1).map(|a| a.count), None);
    }

    #[test]
    fn edge_direction_switch_rebuilds_partitions() {
        let mut controller = controller();
        controller.add_filter(span_filter(60.0, 100.0, pool_color(0)));

        // Outgoing: c's incident edge is e2 (c->d).
        assert_eq!(controller.graph.edges[2].color, pool_color(0));
        assert_eq!(controller.over.grouped[0].edge_slots, vec![2]);

        controller.set_edge_direction(EdgeDirection::Incoming);
        // Incoming: c's incident edge is now e1 (b->c).
        assert_eq!(controller.over.grouped[0].edge_slots, vec![1]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_update_fails_fast() {
        let mut controller = controller();
        controller.update_filter(3, "X", Boundary { min: 0.0, max: 1.0 }, true);
    }
}
