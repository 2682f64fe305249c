// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Accessible pedestrian routing over pre-weighted street graphs.
//!
//! Street graphs are loaded from [GraphML](http://graphml.graphdrawing.org/) files,
//! where every edge length already includes elevation and obstacle penalties
//! (see [weighting]). Routes are found with A* and then turned into
//! human-readable, turn-by-turn [directions](crate::synthesize_directions).
//!
//! # Example
//!
//! ```no_run
//! let mut g = wayfare::Graph::new();
//! let options = wayfare::graphml::Options {
//!     file_format: wayfare::graphml::FileFormat::Unknown,
//! };
//! wayfare::graphml::add_features_from_file(&mut g, &options, "path/to/golden.graphml")
//!     .expect("failed to load golden.graphml");
//!
//! let snapshot = std::sync::Arc::new(wayfare::Snapshot::new(g));
//! let service = wayfare::RouteService::new(snapshot);
//! let route = service
//!     .find_route(
//!         wayfare::Coordinate::new(39.7555, -105.2211),
//!         wayfare::Coordinate::new(39.7472, -105.2130),
//!     )
//!     .expect("failed to find route");
//!
//! for step in &route.directions {
//!     println!("{} ({} m)", step.text, step.distance);
//! }
//! ```

mod astar;
mod bearing;
mod directions;
mod distance;
mod graph;
pub mod graphml;
mod kd;
mod route;
mod store;
mod turn;
pub mod weighting;

pub use astar::{find_route, find_route_scaled, heuristic_scale, SearchError, DEFAULT_STEP_LIMIT};
pub use bearing::bearing;
pub use directions::{synthesize_directions, DirectionStep, ARRIVAL_TEXT, DEFAULT_STREET_NAME};
pub use distance::earth_distance;
pub use graph::{EdgeInfo, Graph};
pub use kd::KDTree;
pub use route::{handle_request, Route, RouteError, RouteRequest, RouteResponse, RouteService};
pub use store::{GraphStore, Snapshot, StoreError};
pub use turn::{turn_direction, Turn};
pub use weighting::Preferences;

/// Represents an intersection or a point along a street in the [Graph].
///
/// Nodes with `id == 0` are disallowed, as zero is used to signify absence of nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,

    /// Height above sea level in meters, if known. Only used by the
    /// [weighting] pipeline.
    pub elevation: Option<f64>,
}

impl Node {
    pub const ZERO: Self = Self {
        id: 0,
        lat: 0.0,
        lon: 0.0,
        elevation: None,
    };

    /// Returns the position of this node.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// Multiple edges may connect the same ordered pair of nodes; they are told apart by `key`.
///
/// `length` should not be less than the crow-flies distance between the two nodes,
/// otherwise [find_route] may return a sub-optimal route.
///
/// Due to implementation details, `to` might not exist in the [Graph].
/// Users must silently ignore such edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: i64,

    /// Index of this edge among all edges between the same ordered pair of nodes.
    pub key: u32,

    /// Routing weight of the edge, in meters plus any accessibility penalties.
    pub length: Option<f64>,

    /// Street name, if any. Unnamed edges are sidewalks.
    pub name: Option<String>,

    /// Set when an obstacle was detected along the edge.
    pub obstacle: bool,
}

impl Edge {
    /// Creates an unnamed, obstacle-free edge with the provided length.
    pub fn new(to: i64, length: f64) -> Self {
        Self {
            to,
            key: 0,
            length: Some(length),
            name: None,
            obstacle: false,
        }
    }

    /// Sets the street name of the edge.
    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Cost of traversing this edge during route search.
    /// Edges without a length count as a single unit.
    pub fn weight(&self) -> f64 {
        self.length.unwrap_or(1.0)
    }
}

/// A latitude-longitude pair, in degrees.
///
/// Serialized as a two-element `[lat, lon]` array.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

/// Result of a geometric computation which never fails outright.
///
/// Malformed input (e.g. non-finite coordinates) produces a [Measured::Fallback]
/// carrying a neutral value, so that callers can keep going while still being
/// able to tell degraded results apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measured<T> {
    Exact(T),
    Fallback(T),
}

impl<T> Measured<T> {
    /// Returns the carried value, regardless of whether it is exact.
    pub fn value(self) -> T {
        match self {
            Self::Exact(v) | Self::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}
