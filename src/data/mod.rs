use std::collections::{BTreeSet, HashMap};

use eframe::egui::Color32;

mod load;

pub use load::{LoadConfig, LoadMessage, spawn_load};

/// Ordered feature-name to value mapping. A lookup miss is defined behavior:
/// the entity simply does not satisfy any boundary on that feature.
pub type FeatureMap = std::collections::BTreeMap<String, f64>;

pub const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(104, 116, 130);
pub const DEFAULT_EDGE_COLOR: Color32 = Color32::from_rgb(68, 74, 82);

#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub id: String,
    pub features: FeatureMap,
    pub x: f32,
    pub y: f32,
    pub color: Color32,
}

impl NodeRecord {
    pub fn feature(&self, key: &str) -> Option<f64> {
        self.features.get(key).copied()
    }
}

#[derive(Clone, Debug)]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    pub features: FeatureMap,
    pub hidden: bool,
    pub color: Color32,
}

/// Which endpoint of an edge counts as its representative node. The choice
/// changes what the overview aggregation means (who "sends" vs "receives").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeDirection {
    Outgoing,
    Incoming,
}

impl EdgeDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
        }
    }

    /// The endpoint edges are indexed by.
    pub fn near<'a>(self, edge: &'a EdgeRecord) -> &'a str {
        match self {
            Self::Outgoing => &edge.source,
            Self::Incoming => &edge.target,
        }
    }

    /// The endpoint opposite the representative one.
    pub fn far<'a>(self, edge: &'a EdgeRecord) -> &'a str {
        match self {
            Self::Outgoing => &edge.target,
            Self::Incoming => &edge.source,
        }
    }
}

/// The loaded node/edge universe. Node and edge identity is immutable after
/// load; only display color and the edge hidden flag are mutated afterwards,
/// and only through the partition pipeline.
#[derive(Clone, Debug)]
pub struct DataSet {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    pub index_by_id: HashMap<String, usize>,
    pub node_features: Vec<String>,
    pub edge_features: Vec<String>,
}

impl DataSet {
    pub fn new(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), slot);
        }

        let node_features = collect_feature_keys(nodes.iter().map(|node| &node.features));
        let edge_features = collect_feature_keys(edges.iter().map(|edge| &edge.features));

        Self {
            nodes,
            edges,
            index_by_id,
            node_features,
            edge_features,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&NodeRecord> {
        self.index_by_id.get(id).map(|&slot| &self.nodes[slot])
    }
}

fn collect_feature_keys<'a>(maps: impl Iterator<Item = &'a FeatureMap>) -> Vec<String> {
    let mut keys = BTreeSet::new();
    for map in maps {
        for key in map.keys() {
            keys.insert(key.clone());
        }
    }
    keys.into_iter().collect()
}

/// Incident-edge lookup keyed by one configurable endpoint. Built once per
/// direction over the whole universe; a miss returns the empty slice.
#[derive(Clone, Debug, Default)]
pub struct EdgeIndex {
    by_endpoint: HashMap<String, Vec<usize>>,
}

impl EdgeIndex {
    pub fn build(edges: &[EdgeRecord], direction: EdgeDirection) -> Self {
        let mut by_endpoint: HashMap<String, Vec<usize>> = HashMap::new();
        for (slot, edge) in edges.iter().enumerate() {
            by_endpoint
                .entry(direction.near(edge).to_owned())
                .or_default()
                .push(slot);
        }
        Self { by_endpoint }
    }

    pub fn edges_for(&self, node_id: &str) -> &[usize] {
        self.by_endpoint
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_owned(),
            features: FeatureMap::new(),
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

    #[test]
    fn edge_index_respects_direction() {
        let edges = vec![edge("e0", "a", "b"), edge("e1", "a", "c"), edge("e2", "b", "a")];

        let outgoing = EdgeIndex::build(&edges, EdgeDirection::Outgoing);
        assert_eq!(outgoing.edges_for("a"), &[0, 1]);
        assert_eq!(outgoing.edges_for("b"), &[2]);

        let incoming = EdgeIndex::build(&edges, EdgeDirection::Incoming);
        assert_eq!(incoming.edges_for("a"), &[2]);
        assert_eq!(incoming.edges_for("b"), &[0]);
        assert_eq!(incoming.edges_for("c"), &[1]);
    }

    #[test]
    fn edge_index_miss_is_empty_not_error() {
        let index = EdgeIndex::build(&[], EdgeDirection::Outgoing);
        assert!(index.edges_for("nowhere").is_empty());
    }

    #[test]
    fn dataset_catalogs_feature_keys() {
        let mut a = node("a");
        a.features.insert("LATITUDE".to_owned(), 12.0);
        let mut b = node("b");
        b.features.insert("LONGITUDE".to_owned(), -3.0);
        b.features.insert("LATITUDE".to_owned(), 40.0);

        let data = DataSet::new(vec![a, b], Vec::new());
        assert_eq!(data.node_features, vec!["LATITUDE", "LONGITUDE"]);
        assert_eq!(data.node_by_id("b").map(|n| n.id.as_str()), Some("b"));
        assert!(data.node_by_id("c").is_none());
    }
}
