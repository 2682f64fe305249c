// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node};
use std::collections::btree_map::{BTreeMap, Entry};

/// Represents a street network as a set of [Nodes](Node)
/// and directed, possibly parallel [Edges](Edge) between them.
///
/// Iteration order over nodes is always by ascending id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(pub(crate) BTreeMap<i64, (Node, Vec<Edge>)>);

/// Attributes of the edge chosen to represent a connection between two nodes,
/// see [Graph::edge_info].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInfo<'a> {
    pub name: Option<&'a str>,
    pub length: Option<f64>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of edges in the graph, counting each parallel edge.
    pub fn edge_count(&self) -> usize {
        self.0.values().map(|(_, edges)| edges.len()).sum()
    }

    /// Returns an iterator over all [Nodes](Node) in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter().map(|(_, (node, _))| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All outgoing and incoming edges are preserved.
    pub fn set_node(&mut self, node: Node) {
        assert_ne!(node.id, 0);

        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Finds the closest [Node] to the given position.
    ///
    /// This function requires computing the distance to every [Node] in the graph,
    /// and is not suitable for large graphs or repeated lookups - use a [KDTree](crate::KDTree)
    /// instead.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<Node> {
        self.0
            .values()
            .map(|&(nd, _)| (earth_distance(lat, lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, nd)| nd)
    }

    /// Gets all outgoing [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the representative [Edge] from one node to another.
    ///
    /// If multiple parallel edges exist, the one with the lowest
    /// [key](Edge::key) is returned, regardless of its length.
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> Option<&Edge> {
        self.get_edges(from_id)
            .iter()
            .filter(|edge| edge.to == to_id)
            .min_by_key(|edge| edge.key)
    }

    /// Resolves the street name and length of the representative edge
    /// between two nodes (see [Graph::get_edge]).
    ///
    /// Returns `None` if there is no edge from `from_id` to `to_id`,
    /// which is a normal outcome and not an error.
    pub fn edge_info(&self, from_id: i64, to_id: i64) -> Option<EdgeInfo<'_>> {
        self.get_edge(from_id, to_id).map(|edge| EdgeInfo {
            name: edge.name.as_deref(),
            length: edge.length,
        })
    }

    /// Adds an [Edge] originating at a node with a given id, and returns its
    /// effective key.
    ///
    /// If there already is an edge to `edge.to` with the same key, the new edge
    /// gets the smallest key greater than all existing keys for that pair of nodes.
    /// Edges from unknown nodes are ignored, and `None` is returned.
    pub fn add_edge(&mut self, from_id: i64, mut edge: Edge) -> Option<u32> {
        assert_ne!(from_id, 0);
        assert_ne!(edge.to, 0);

        let (_, edges) = self.0.get_mut(&from_id)?;
        let to_id = edge.to;
        let parallel = edges.iter().filter(|e| e.to == to_id).map(|e| e.key);
        if parallel.clone().any(|key| key == edge.key) {
            edge.key = parallel.max().map_or(0, |key| key + 1);
        }

        let key = edge.key;
        edges.push(edge);
        Some(key)
    }

    /// Removes all parallel edges from one node to another.
    pub fn delete_edge(&mut self, from_id: i64, to_id: i64) {
        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            edges.retain(|edge| edge.to != to_id);
        }
    }

    /// Iterates over every edge together with the nodes it connects.
    /// Edges pointing at unknown nodes are skipped.
    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = (Node, Option<Node>, &mut Edge)> {
        let nodes: BTreeMap<i64, Node> = self.0.iter().map(|(&id, &(nd, _))| (id, nd)).collect();
        self.0.values_mut().flat_map(move |(from, edges)| {
            let from = *from;
            let to_nodes: Vec<Option<Node>> =
                edges.iter().map(|e| nodes.get(&e.to).copied()).collect();
            edges
                .iter_mut()
                .zip(to_nodes)
                .map(move |(edge, to)| (from, to, edge))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, lat: f64, lon: f64) -> Node {
        Node {
            id,
            lat,
            lon,
            elevation: None,
        }
    }

    fn simple_graph() -> Graph {
        let mut g = Graph::new();
        g.set_node(node(1, 0.0, 0.0));
        g.set_node(node(2, 0.0, 0.001));
        g.set_node(node(3, 0.001, 0.001));
        g.add_edge(1, Edge::new(2, 111.0).named("Main Street"));
        g.add_edge(2, Edge::new(3, 111.0));
        g
    }

    #[test]
    fn edge_info_of_named_edge() {
        let g = simple_graph();
        assert_eq!(
            g.edge_info(1, 2),
            Some(EdgeInfo {
                name: Some("Main Street"),
                length: Some(111.0),
            })
        );
    }

    #[test]
    fn edge_info_of_missing_edge() {
        let g = simple_graph();
        assert_eq!(g.edge_info(2, 1), None);
        assert_eq!(g.edge_info(1, 3), None);
        assert_eq!(g.edge_info(42, 1), None);
    }

    #[test]
    fn edge_info_picks_lowest_key() {
        let mut g = simple_graph();
        let mut shorter = Edge::new(2, 50.0).named("Alley");
        shorter.key = 7;
        assert_eq!(g.add_edge(1, shorter), Some(7));

        let info = g.edge_info(1, 2).unwrap();
        assert_eq!(info.name, Some("Main Street"));
        assert_eq!(info.length, Some(111.0));

        // Insertion order must not matter
        let mut h = Graph::new();
        h.set_node(node(1, 0.0, 0.0));
        h.set_node(node(2, 0.0, 0.001));
        let mut first = Edge::new(2, 10.0).named("Second");
        first.key = 3;
        h.add_edge(1, first);
        let mut second = Edge::new(2, 20.0).named("First");
        second.key = 1;
        h.add_edge(1, second);
        assert_eq!(h.edge_info(1, 2).unwrap().name, Some("First"));
    }

    #[test]
    fn add_edge_resolves_key_collisions() {
        let mut g = simple_graph();
        assert_eq!(g.add_edge(1, Edge::new(2, 120.0)), Some(1));
        assert_eq!(g.add_edge(1, Edge::new(2, 130.0)), Some(2));
        assert_eq!(g.add_edge(1, Edge::new(3, 130.0)), Some(0));
        assert_eq!(g.add_edge(99, Edge::new(3, 130.0)), None);
        assert_eq!(g.edge_count(), 5);
    }

    #[test]
    fn delete_edge_removes_parallel_edges() {
        let mut g = simple_graph();
        g.add_edge(1, Edge::new(2, 120.0));
        g.delete_edge(1, 2);
        assert!(g.get_edge(1, 2).is_none());
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn find_nearest_node() {
        let g = simple_graph();
        assert_eq!(g.find_nearest_node(0.0009, 0.0011).map(|n| n.id), Some(3));
        assert_eq!(g.find_nearest_node(-1.0, -1.0).map(|n| n.id), Some(1));
        assert_eq!(Graph::new().find_nearest_node(0.0, 0.0), None);
    }
}
