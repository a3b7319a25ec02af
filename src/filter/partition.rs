use crate::data::{EdgeIndex, EdgeRecord, NodeRecord};

use super::Filter;

/// Assignment of every node slot to exactly one filter bucket or `unmapped`.
#[derive(Clone, Debug, Default)]
pub struct NodePartition {
    pub mapped: Vec<Vec<usize>>,
    pub unmapped: Vec<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct EdgePartition {
    pub mapped: Vec<Vec<usize>>,
    pub unmapped: Vec<usize>,
}

/// Scans filters in list order for each node and assigns it to the first
/// filter that contains it. Filters are not mutually exclusive by
/// construction, so list position acts as the priority tie-break: earlier
/// filters win overlaps, which keeps the visual result stable and
/// deterministic. Brute force over all nodes, O(|nodes| x |filters|).
pub fn partition_nodes(nodes: &[NodeRecord], filters: &[Filter]) -> NodePartition {
    let mut mapped = vec![Vec::new(); filters.len()];
    let mut unmapped = Vec::new();

    'nodes: for (slot, node) in nodes.iter().enumerate() {
        for (position, filter) in filters.iter().enumerate() {
            if filter.contains_node(node) {
                mapped[position].push(slot);
                continue 'nodes;
            }
        }
        unmapped.push(slot);
    }

    NodePartition { mapped, unmapped }
}

/// Assigns each indexed edge to a bucket. Edge membership piggybacks on node
/// membership: an edge belongs to filter `i` iff its representative endpoint
/// (the one the index is keyed by) sits in filter `i`'s node bucket AND the
/// edge passes that filter's edge-level boundaries. Edges of unmapped nodes
/// go to `unmapped` wholesale; an edge whose own features would pass a later
/// filter still cannot map there. Every indexed edge lands in exactly one
/// bucket.
pub fn partition_edges(
    node_partition: &NodePartition,
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
    index: &EdgeIndex,
    filters: &[Filter],
) -> EdgePartition {
    debug_assert_eq!(node_partition.mapped.len(), filters.len());

    let mut mapped = vec![Vec::new(); filters.len()];
    let mut unmapped = Vec::new();

    for (position, bucket) in node_partition.mapped.iter().enumerate() {
        for &node_slot in bucket {
            for &edge_slot in index.edges_for(&nodes[node_slot].id) {
                if filters[position].contains_edge(&edges[edge_slot]) {
                    mapped[position].push(edge_slot);
                } else {
                    unmapped.push(edge_slot);
                }
            }
        }
    }

    for &node_slot in &node_partition.unmapped {
        for &edge_slot in index.edges_for(&nodes[node_slot].id) {
            unmapped.push(edge_slot);
        }
    }

    EdgePartition { mapped, unmapped }
}
