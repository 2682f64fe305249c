// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    synthesize_directions, Coordinate, DirectionStep, GraphStore, Preferences, SearchError,
    Snapshot, StoreError, DEFAULT_STEP_LIMIT,
};

/// A found route: positions of all traversed nodes, together with
/// turn-by-turn directions along them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "route")]
    pub coordinates: Vec<Coordinate>,
    pub directions: Vec<DirectionStep>,
}

/// Error conditions which may occur when resolving a route request.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("graph has no nodes")]
    EmptyGraph,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Finds routes between arbitrary positions over a single graph [Snapshot].
#[derive(Debug, Clone)]
pub struct RouteService {
    snapshot: Arc<Snapshot>,
    step_limit: usize,
}

impl RouteService {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            snapshot,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Overrides the [step limit](crate::find_route) of route searches.
    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    /// Finds the shortest route between the nodes closest to `origin` and `destination`,
    /// and describes it with directions.
    pub fn find_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, RouteError> {
        let from = self
            .snapshot
            .find_nearest_node(origin.lat, origin.lon)
            .ok_or(RouteError::EmptyGraph)?;
        let to = self
            .snapshot
            .find_nearest_node(destination.lat, destination.lon)
            .ok_or(RouteError::EmptyGraph)?;
        log::debug!("searching for a route from node {} to node {}", from.id, to.id);

        let g = self.snapshot.graph();
        let path = crate::find_route_scaled(
            g,
            from.id,
            to.id,
            self.step_limit,
            self.snapshot.heuristic_scale(),
        )?;

        let coordinates = path
            .iter()
            .filter_map(|&id| g.get_node(id))
            .map(|n| n.coordinate())
            .collect();
        let directions = synthesize_directions(g, &path);

        Ok(Route {
            coordinates,
            directions,
        })
    }
}

/// Body of a route request, as sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub elevation_pref: u8,
    pub obstacle_pref: bool,
}

impl RouteRequest {
    pub fn preferences(&self) -> Preferences {
        Preferences {
            elevation: self.elevation_pref,
            avoid_obstacles: self.obstacle_pref,
        }
    }
}

/// Response to a [RouteRequest]: either a [Route] or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteResponse {
    Route(Route),
    Error { error: String },
}

impl From<Result<Route, RouteError>> for RouteResponse {
    fn from(r: Result<Route, RouteError>) -> Self {
        match r {
            Ok(route) => Self::Route(route),
            Err(e) => {
                log::warn!("route request failed: {}", e);
                Self::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Resolves a [RouteRequest] against the graph variant selected by its preferences.
/// All failures are reported through [RouteResponse::Error].
pub fn handle_request(store: &GraphStore, request: RouteRequest) -> RouteResponse {
    let resolve = || -> Result<Route, RouteError> {
        let snapshot = store.get(request.preferences())?;
        RouteService::new(snapshot).find_route(request.origin, request.destination)
    };
    resolve().into()
}
