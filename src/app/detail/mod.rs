use eframe::egui::{Color32, Vec2};

use crate::data::{DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR, DataSet};
use crate::filter::{EdgePartition, Filter, NodePartition};
use crate::scale::{GRAPH_MAX, GRAPH_MIN, GraphRect, ScaleMap};

mod view;

/// Detail-view state: the active axis pair, the per-axis scaling cache, the
/// camera, and one selection rectangle per filter (graph-space geometry).
/// Filters that do not constrain the current axes have no rectangle.
pub struct DetailView {
    pub x_axis: String,
    pub y_axis: String,
    pub scale: ScaleMap,
    pub pan: Vec2,
    pub zoom: f32,
    pub boxes: Vec<Option<GraphRect>>,
    pub active_box: Option<usize>,
    pub show_unmapped_edges: bool,
}

impl DetailView {
    pub fn new(x_axis: String, y_axis: String) -> Self {
        Self {
            x_axis,
            y_axis,
            scale: ScaleMap::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            boxes: Vec::new(),
            active_box: None,
            // Edges start hidden so a dense dataset does not open as clutter.
            show_unmapped_edges: false,
        }
    }

    /// Re-derives every node's display coordinates from the current axes.
    /// Extrema come from the scale cache, so a previously seen axis keeps
    /// its original scaling.
    pub fn rescale_positions(&mut self, graph: &mut DataSet) {
        self.scale.ensure_axis(&self.x_axis, &graph.nodes);
        self.scale.ensure_axis(&self.y_axis, &graph.nodes);

        let midpoint = ((GRAPH_MIN + GRAPH_MAX) / 2.0) as f32;
        for node in &mut graph.nodes {
            node.x = node
                .feature(&self.x_axis)
                .map(|value| self.scale.feature_to_graph(&self.x_axis, value) as f32)
                .unwrap_or(midpoint);
            node.y = node
                .feature(&self.y_axis)
                .map(|value| self.scale.feature_to_graph(&self.y_axis, value) as f32)
                .unwrap_or(midpoint);
        }
    }

    pub fn set_axes(&mut self, graph: &mut DataSet, x_axis: String, y_axis: String) {
        self.x_axis = x_axis;
        self.y_axis = y_axis;
        self.rescale_positions(graph);
    }

    pub fn push_selection_box(&mut self) {
        self.boxes.push(None);
    }

    /// Re-derives one selection rectangle from its filter's boundaries on
    /// the active axes. Normalization matters: latitude inversion flips the
    /// graph-space endpoint order.
    pub fn recalc_selection_box(&mut self, idx: usize, filter: &Filter) {
        if idx >= self.boxes.len() {
            self.boxes.resize_with(idx + 1, || None);
        }

        let x_bounds = filter.node_boundary(&self.x_axis);
        let y_bounds = filter.node_boundary(&self.y_axis);

        self.boxes[idx] = match (x_bounds, y_bounds) {
            (Some(x), Some(y)) => {
                let gx1 = self.scale.feature_to_graph(&self.x_axis, x.min);
                let gx2 = self.scale.feature_to_graph(&self.x_axis, x.max);
                let gy1 = self.scale.feature_to_graph(&self.y_axis, y.min);
                let gy2 = self.scale.feature_to_graph(&self.y_axis, y.max);
                Some(GraphRect {
                    x1: gx1.min(gx2),
                    x2: gx1.max(gx2),
                    y1: gy1.min(gy2),
                    y2: gy1.max(gy2),
                })
            }
            _ => None,
        };
    }

    pub fn swap_selection_boxes(&mut self, a: usize, b: usize) {
        if a < self.boxes.len() && b < self.boxes.len() {
            self.boxes.swap(a, b);
            self.active_box = match self.active_box {
                Some(active) if active == a => Some(b),
                Some(active) if active == b => Some(a),
                other => other,
            };
        }
    }

    pub fn remove_selection_box(&mut self, idx: usize) {
        if idx >= self.boxes.len() {
            return;
        }

        self.boxes.remove(idx);
        self.active_box = match self.active_box {
            Some(active) if active == idx => None,
            Some(active) if active > idx => Some(active - 1),
            other => other,
        };
    }

    /// Applies a partition result as node/edge coloring. Mapped entities
    /// take their filter's marking color; everything else falls back to the
    /// defaults, with unmapped edges hidden unless toggled visible.
    pub fn recalc_coloring(
        &self,
        graph: &mut DataSet,
        node_partition: &NodePartition,
        edge_partition: &EdgePartition,
        colors: &[Color32],
    ) {
        for node in &mut graph.nodes {
            node.color = DEFAULT_NODE_COLOR;
        }
        for (position, bucket) in node_partition.mapped.iter().enumerate() {
            for &slot in bucket {
                graph.nodes[slot].color = colors[position];
            }
        }

        for edge in &mut graph.edges {
            edge.color = DEFAULT_EDGE_COLOR;
            edge.hidden = !self.show_unmapped_edges;
        }
        for (position, bucket) in edge_partition.mapped.iter().enumerate() {
            for &slot in bucket {
                let edge = &mut graph.edges[slot];
                edge.color = colors[position];
                edge.hidden = false;
            }
        }
    }
}
