// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Offline pipeline turning a base street graph into per-preference
//! variants, where edge lengths include accessibility penalties.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{graphml, Graph};

/// Penalty added to the length of every edge with an obstacle,
/// when obstacles are to be avoided. Large enough to make any detour preferable,
/// while still allowing a route over an obstacle if there is no other way.
pub const OBSTACLE_PENALTY: f64 = 999_999_999_999.0;

/// Smallest allowed [Preferences::elevation].
pub const MIN_ELEVATION_PREFERENCE: u8 = 1;

/// Largest allowed [Preferences::elevation].
pub const MAX_ELEVATION_PREFERENCE: u8 = 10;

/// User preferences which determine the weights of a graph variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Preferences {
    /// How strongly to avoid elevation changes, from 1 to 10. Each meter of
    /// climb or descent along an edge adds `elevation²` to its length.
    pub elevation: u8,

    /// Whether to (strongly) avoid edges with detected obstacles.
    pub avoid_obstacles: bool,
}

impl Preferences {
    pub fn is_valid(&self) -> bool {
        (MIN_ELEVATION_PREFERENCE..=MAX_ELEVATION_PREFERENCE).contains(&self.elevation)
    }

    /// Iterates over all valid combinations of preferences.
    pub fn all() -> impl Iterator<Item = Preferences> {
        (MIN_ELEVATION_PREFERENCE..=MAX_ELEVATION_PREFERENCE).flat_map(|elevation| {
            [true, false].into_iter().map(move |avoid_obstacles| Preferences {
                elevation,
                avoid_obstacles,
            })
        })
    }

    /// Name of the GraphML file holding the graph variant for these preferences.
    pub fn variant_file_name(&self) -> String {
        format!(
            "golden_graph_with_elevation_and_obstacles_userpref_{}_avoid_{}.graphml",
            self.elevation,
            if self.avoid_obstacles { "True" } else { "False" },
        )
    }
}

impl fmt::Display for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "elevation preference {}, avoid obstacles: {}",
            self.elevation, self.avoid_obstacles
        )
    }
}

/// Adds accessibility penalties to the lengths of all edges in the graph.
///
/// Edges between two nodes with known elevation get `|Δelevation| * elevation²` added,
/// and, if requested, edges with obstacles get [OBSTACLE_PENALTY] added.
/// Edges without a length are left untouched.
pub fn apply(g: &mut Graph, preferences: Preferences) {
    let factor = f64::from(preferences.elevation).powi(2);
    let mut penalized_obstacles: usize = 0;

    for (from, to, edge) in g.edges_mut() {
        let Some(length) = edge.length.as_mut() else {
            continue;
        };

        if let (Some(a), Some(b)) = (from.elevation, to.and_then(|n| n.elevation)) {
            *length += (a - b).abs() * factor;
        }

        if preferences.avoid_obstacles && edge.obstacle {
            *length += OBSTACLE_PENALTY;
            penalized_obstacles += 1;
        }
    }

    log::debug!(
        "applied {}: {} obstacle edges penalized",
        preferences,
        penalized_obstacles
    );
}

/// Creates a weighted copy of the base graph for every combination of [Preferences],
/// and saves them in `out_dir` under their [variant file names](Preferences::variant_file_name).
///
/// Returns the paths of all written files.
pub fn generate_variants<P: AsRef<Path>>(
    base: &Graph,
    out_dir: P,
) -> Result<Vec<PathBuf>, graphml::Error> {
    std::fs::create_dir_all(out_dir.as_ref())?;

    Preferences::all()
        .map(|preferences| -> Result<PathBuf, graphml::Error> {
            let mut g = base.clone();
            apply(&mut g, preferences);

            let path = out_dir.as_ref().join(preferences.variant_file_name());
            log::info!("generating graph with {} into {}", preferences, path.display());
            graphml::write_to_file(&g, &path)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};

    fn sloped_graph() -> Graph {
        let mut g = Graph::new();
        g.set_node(Node {
            id: 1,
            lat: 39.7400,
            lon: -105.2200,
            elevation: Some(1730.0),
        });
        g.set_node(Node {
            id: 2,
            lat: 39.7410,
            lon: -105.2200,
            elevation: Some(1732.5),
        });
        g.set_node(Node {
            id: 3,
            lat: 39.7420,
            lon: -105.2200,
            elevation: None,
        });
        g.add_edge(1, Edge::new(2, 111.0));
        g.add_edge(2, Edge::new(1, 111.0));
        let mut blocked = Edge::new(3, 111.0);
        blocked.obstacle = true;
        g.add_edge(2, blocked);
        g.add_edge(
            3,
            Edge {
                to: 2,
                key: 0,
                length: None,
                name: None,
                obstacle: true,
            },
        );
        g
    }

    #[test]
    fn elevation_penalty() {
        let mut g = sloped_graph();
        apply(
            &mut g,
            Preferences {
                elevation: 3,
                avoid_obstacles: false,
            },
        );

        // 2.5 m of elevation change, times 3²
        assert_eq!(g.edge_info(1, 2).unwrap().length, Some(133.5));
        assert_eq!(g.edge_info(2, 1).unwrap().length, Some(133.5));

        // Unknown elevation - no penalty; obstacles are not avoided
        assert_eq!(g.edge_info(2, 3).unwrap().length, Some(111.0));
        assert_eq!(g.edge_info(3, 2).unwrap().length, None);
    }

    #[test]
    fn obstacle_penalty() {
        let mut g = sloped_graph();
        apply(
            &mut g,
            Preferences {
                elevation: 1,
                avoid_obstacles: true,
            },
        );

        assert_eq!(g.edge_info(1, 2).unwrap().length, Some(113.5));
        assert_eq!(g.edge_info(2, 3).unwrap().length, Some(111.0 + OBSTACLE_PENALTY));
        assert_eq!(g.edge_info(3, 2).unwrap().length, None);
    }

    #[test]
    fn all_preferences() {
        let all: Vec<Preferences> = Preferences::all().collect();
        assert_eq!(all.len(), 20);
        assert!(all.iter().all(Preferences::is_valid));
        assert!(!Preferences {
            elevation: 0,
            avoid_obstacles: false
        }
        .is_valid());
    }

    #[test]
    fn variant_file_name() {
        let p = Preferences {
            elevation: 7,
            avoid_obstacles: true,
        };
        assert_eq!(
            p.variant_file_name(),
            "golden_graph_with_elevation_and_obstacles_userpref_7_avoid_True.graphml"
        );
    }
}
