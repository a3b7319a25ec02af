use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::data::{EdgeRecord, FeatureMap, NodeRecord};

mod partition;

pub use partition::{EdgePartition, NodePartition, partition_edges, partition_nodes};

/// Inclusive feature-space interval. Callers supply normalized values
/// (`min <= max`); an inverted boundary is accepted and simply matches
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    pub min: f64,
    pub max: f64,
}

/// Fixed marking-color pool, cycled by filter creation count. The color is
/// assigned once at creation and stays with the filter through reorders and
/// removals.
pub const COLOR_POOL: [Color32; 10] = [
    Color32::from_rgb(188, 179, 66),
    Color32::from_rgb(132, 98, 202),
    Color32::from_rgb(96, 175, 75),
    Color32::from_rgb(201, 97, 177),
    Color32::from_rgb(75, 176, 146),
    Color32::from_rgb(205, 73, 59),
    Color32::from_rgb(104, 140, 205),
    Color32::from_rgb(200, 129, 67),
    Color32::from_rgb(196, 92, 119),
    Color32::from_rgb(118, 125, 56),
];

pub fn pool_color(created: usize) -> Color32 {
    COLOR_POOL[created % COLOR_POOL.len()]
}

/// One axis-aligned multidimensional selection box over feature space.
/// Node-level and edge-level boundaries are tracked separately; the filter
/// owns its boundary maps exclusively and exposes them only through
/// `set_*_boundary` and the `contains_*` predicates.
#[derive(Clone, Debug)]
pub struct Filter {
    node_bounds: BTreeMap<String, Boundary>,
    edge_bounds: BTreeMap<String, Boundary>,
    pub color: Color32,
}

impl Filter {
    /// Builds a filter constraining the given features on the node level.
    /// Edge-level boundaries are added separately: selection rectangles are
    /// drawn over node axes, and a node-axis constraint copied onto edges
    /// would exclude every edge lacking that feature. An empty entry list is
    /// valid and matches everything.
    pub fn new(entries: &[(&str, Boundary)], color: Color32) -> Self {
        let mut node_bounds = BTreeMap::new();
        for (feature, boundary) in entries {
            node_bounds.insert((*feature).to_owned(), *boundary);
        }

        Self {
            node_bounds,
            edge_bounds: BTreeMap::new(),
            color,
        }
    }

    /// Replaces (never merges) the node-level boundary for one feature.
    pub fn set_node_boundary(&mut self, feature: &str, boundary: Boundary) {
        self.node_bounds.insert(feature.to_owned(), boundary);
    }

    pub fn set_edge_boundary(&mut self, feature: &str, boundary: Boundary) {
        self.edge_bounds.insert(feature.to_owned(), boundary);
    }

    pub fn node_boundary(&self, feature: &str) -> Option<Boundary> {
        self.node_bounds.get(feature).copied()
    }

    pub fn contains_node(&self, node: &NodeRecord) -> bool {
        matches(&self.node_bounds, &node.features)
    }

    pub fn contains_edge(&self, edge: &EdgeRecord) -> bool {
        matches(&self.edge_bounds, &edge.features)
    }
}

/// True iff every constrained feature is present and inside its boundary.
/// A missing feature never silently passes.
fn matches(bounds: &BTreeMap<String, Boundary>, features: &FeatureMap) -> bool {
    for (feature, boundary) in bounds {
        match features.get(feature) {
            Some(value) if *value >= boundary.min && *value <= boundary.max => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DEFAULT_NODE_COLOR;

    fn node(entries: &[(&str, f64)]) -> NodeRecord {
        let mut features = FeatureMap::new();
        for (key, value) in entries {
            features.insert((*key).to_owned(), *value);
        }
        NodeRecord {
            id: "n".to_owned(),
            features,
            x: 0.0,
            y: 0.0,
            color: DEFAULT_NODE_COLOR,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::new(&[], pool_color(0));
        assert!(filter.contains_node(&node(&[])));
        assert!(filter.contains_node(&node(&[("X", 1e9)])));
    }

    #[test]
    fn boundaries_are_inclusive_both_ends() {
        let filter = Filter::new(&[("X", Boundary { min: 0.0, max: 50.0 })], pool_color(0));
        assert!(filter.contains_node(&node(&[("X", 0.0)])));
        assert!(filter.contains_node(&node(&[("X", 50.0)])));
        assert!(!filter.contains_node(&node(&[("X", 50.000001)])));
        assert!(!filter.contains_node(&node(&[("X", -0.000001)])));
    }

    #[test]
    fn missing_feature_never_passes() {
        let filter = Filter::new(&[("X", Boundary { min: 0.0, max: 50.0 })], pool_color(0));
        assert!(!filter.contains_node(&node(&[("Y", 25.0)])));
    }

    #[test]
    fn inverted_boundary_matches_nothing() {
        let mut filter = Filter::new(&[], pool_color(0));
        filter.set_node_boundary("X", Boundary { min: 10.0, max: 5.0 });
        assert!(!filter.contains_node(&node(&[("X", 7.0)])));
        assert!(!filter.contains_node(&node(&[("X", 10.0)])));
    }

    #[test]
    fn set_boundary_replaces_not_merges() {
        let mut filter = Filter::new(&[("X", Boundary { min: 0.0, max: 10.0 })], pool_color(0));
        filter.set_node_boundary("X", Boundary { min: 90.0, max: 100.0 });
        assert!(!filter.contains_node(&node(&[("X", 5.0)])));
        assert!(filter.contains_node(&node(&[("X", 95.0)])));
    }

    #[test]
    fn node_constraints_do_not_leak_onto_edges() {
        use crate::data::DEFAULT_EDGE_COLOR;

        let filter = Filter::new(&[("X", Boundary { min: 0.0, max: 50.0 })], pool_color(0));
        let edge = EdgeRecord {
            id: "e".to_owned(),
            source: "a".to_owned(),
            target: "b".to_owned(),
            features: FeatureMap::new(),
            hidden: false,
            color: DEFAULT_EDGE_COLOR,
        };
        // No edge-level bounds: the edge passes regardless of node bounds.
        assert!(filter.contains_edge(&edge));

        let mut filter = filter;
        filter.set_edge_boundary("DISTANCE", Boundary { min: 0.0, max: 10.0 });
        assert!(!filter.contains_edge(&edge));
    }

    #[test]
    fn pool_cycles_by_creation_count() {
        assert_eq!(pool_color(0), COLOR_POOL[0]);
        assert_eq!(pool_color(9), COLOR_POOL[9]);
        assert_eq!(pool_color(10), COLOR_POOL[0]);
        assert_eq!(pool_color(23), COLOR_POOL[3]);
    }
}
