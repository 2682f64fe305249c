// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Graph, Node};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-neighbor search for large datasets.
/// Every routing request needs two nearest-node lookups, so a k-d tree is built once
/// per [Snapshot](crate::Snapshot) instead of scanning the whole [Graph] with
/// [Graph::find_nearest_node].
///
/// This implementation assumes euclidean geometry, even though the distance function
/// used is [earth_distance]. This results in undefined behavior when points
/// are close to the ante meridian (180°/-180° longitude) or poles (90°/-90° latitude),
/// or when the data spans multiple continents.
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Node {
        self.find_nearest_node_impl(lat, lon, false).0
    }

    fn find_nearest_node_impl(&self, lat: f64, lon: f64, lon_divides: bool) -> (Node, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = earth_distance(lat, lon, best.lat, best.lon);

        let first_left = if lon_divides {
            lon < best.lon
        } else {
            lat < best.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        if let Some(ref branch) = first {
            let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, !lon_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        if let Some(ref branch) = second {
            // A closer node is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let (axis_lat, axis_lon) = if lon_divides {
                (lat, self.pivot.lon)
            } else {
                (self.pivot.lat, lon)
            };
            let dist_to_axis = earth_distance(lat, lon, axis_lat, axis_lon);

            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.find_nearest_node_impl(lat, lon, !lon_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree over all nodes of a [Graph].
    pub fn from_graph(g: &Graph) -> Option<Self> {
        Self::from_iter(g.iter().copied())
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facility building the tree.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [Node], lon_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    nodes.sort_by(|a, b| a.lon.total_cmp(&b.lon));
                } else {
                    nodes.sort_by(|a, b| a.lat.total_cmp(&b.lat));
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !lon_divides).map(Box::new),
                    right: Self::build_impl(right, !lon_divides).map(Box::new),
                })
            }
        }
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

    #[test]
    fn kd_tree() {
        let tree = KDTree::build(&mut [
            node(1, 0.01, 0.01),
            node(2, 0.01, 0.05),
            node(3, 0.03, 0.09),
            node(4, 0.04, 0.03),
            node(5, 0.04, 0.07),
            node(6, 0.07, 0.03),
            node(7, 0.07, 0.01),
            node(8, 0.08, 0.05),
            node(9, 0.08, 0.09),
        ])
        .expect("k-d tree from non-empty slice must not be empty");

        assert_eq!(tree.find_nearest_node(0.02, 0.02).id, 1);
        assert_eq!(tree.find_nearest_node(0.05, 0.03).id, 4);
        assert_eq!(tree.find_nearest_node(0.05, 0.08).id, 5);
        assert_eq!(tree.find_nearest_node(0.09, 0.06).id, 8);
    }

    #[test]
    fn agrees_with_linear_scan() {
        let mut g = Graph::new();
        for i in 0..50 {
            let lat = 39.73 + (i % 7) as f64 * 0.0031;
            let lon = -105.23 + (i / 7) as f64 * 0.0027;
            g.set_node(node(i + 1, lat, lon));
        }
        let tree = KDTree::from_graph(&g).unwrap();

        for &(lat, lon) in &[(39.731, -105.229), (39.745, -105.215), (39.76, -105.20)] {
            let expected = g.find_nearest_node(lat, lon).unwrap();
            assert_eq!(tree.find_nearest_node(lat, lon).id, expected.id);
        }
    }

    #[test]
    fn empty_graph() {
        assert!(KDTree::from_graph(&Graph::new()).is_none());
    }
}
