// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::{graphml, Graph, KDTree, Preferences};

/// A finished, read-only [Graph] together with its nearest-node index.
///
/// Snapshots are shared between concurrent requests through an [Arc];
/// nothing can modify the graph once it has been published.
#[derive(Debug)]
pub struct Snapshot {
    graph: Graph,
    index: Option<KDTree>,
    heuristic_scale: f64,
}

impl Snapshot {
    pub fn new(graph: Graph) -> Self {
        let index = KDTree::from_graph(&graph);
        let heuristic_scale = crate::heuristic_scale(&graph);
        if heuristic_scale < 1.0 {
            log::debug!("route search heuristic scaled down to {}", heuristic_scale);
        }
        Self {
            graph,
            index,
            heuristic_scale,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The [heuristic_scale](crate::heuristic_scale) of the graph.
    pub fn heuristic_scale(&self) -> f64 {
        self.heuristic_scale
    }

    /// Finds the closest node to the given position,
    /// or returns `None` if the graph is empty.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<crate::Node> {
        self.index
            .as_ref()
            .map(|index| index.find_nearest_node(lat, lon))
    }
}

/// Error conditions which may occur when retrieving a graph variant from a [GraphStore].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid preferences: {0}")]
    InvalidPreferences(Preferences),

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: graphml::Error,
    },
}

/// Lazily loads and caches pre-weighted graph variants (see [weighting](crate::weighting))
/// from a directory.
///
/// Every variant is loaded at most once (unless concurrent requests race to load it),
/// and then shared as an immutable [Snapshot].
#[derive(Debug)]
pub struct GraphStore {
    dir: PathBuf,
    cache: RwLock<HashMap<Preferences, Arc<Snapshot>>>,
}

impl GraphStore {
    /// Creates a store reading variant files from the given directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            cache: RwLock::default(),
        }
    }

    /// Path to the file with the graph variant for the provided preferences.
    pub fn variant_path(&self, preferences: Preferences) -> PathBuf {
        self.dir.join(preferences.variant_file_name())
    }

    /// Publishes an already-weighted graph as the variant for the provided preferences,
    /// replacing any cached one.
    pub fn publish(&self, preferences: Preferences, graph: Graph) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::new(graph));
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(preferences, Arc::clone(&snapshot));
        snapshot
    }

    /// Retrieves the graph variant for the provided preferences,
    /// loading it from disk if it hasn't been loaded yet.
    pub fn get(&self, preferences: Preferences) -> Result<Arc<Snapshot>, StoreError> {
        if !preferences.is_valid() {
            return Err(StoreError::InvalidPreferences(preferences));
        }

        if let Some(snapshot) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&preferences)
        {
            return Ok(Arc::clone(snapshot));
        }

        // Load without holding the lock, so that other variants stay available
        let path = self.variant_path(preferences);
        log::info!("loading graph variant from {}", path.display());
        let mut g = Graph::default();
        graphml::add_features_from_file(&mut g, &graphml::Options::default(), &path)
            .map_err(|source| StoreError::Load {
                path: path.clone(),
                source,
            })?;
        log::debug!(
            "loaded {} nodes and {} edges from {}",
            g.len(),
            g.edge_count(),
            path.display()
        );

        let snapshot = Arc::new(Snapshot::new(g));
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(preferences).or_insert(snapshot)))
    }
}
