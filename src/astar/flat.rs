// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{earth_distance, Graph, SearchError};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score.eq(&other.score)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.total_cmp(&self.score)
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the route minimizing the total [weight](crate::Edge::weight) of traversed edges
/// between two nodes in the provided graph.
///
/// Returns the ids of all nodes along the route, including both `from_id` and `to_id`.
/// If `from_id == to_id`, the route consists of that single node.
///
/// The great-circle distance to the target, scaled down by [heuristic_scale], is used
/// as the heuristic, so the returned route is always a minimum-weight one.
/// This requires a scan over all edges; use [find_route_scaled] to reuse a precomputed scale.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [SearchError::StepLimitExceeded]. Concluding that no route exists requires
/// expanding all nodes accessible from the start, which is usually very time-consuming,
/// especially on large datasets. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, SearchError> {
    find_route_scaled(g, from_id, to_id, step_limit, heuristic_scale(g))
}

/// Returns the largest factor (at most 1) by which the great-circle distance between
/// the ends of any edge can be multiplied without exceeding the [weight](crate::Edge::weight)
/// of that edge.
///
/// Multiplying the A* heuristic by this factor keeps it admissible and consistent,
/// even when some edges are shorter than the crow-flies distance (e.g. edges without a length).
/// Graphs whose edge lengths are never below the crow-flies distance have a scale of 1.
pub fn heuristic_scale(g: &Graph) -> f64 {
    let mut scale: f64 = 1.0;
    for from in g.iter() {
        for edge in g.get_edges(from.id) {
            if let Some(to) = g.get_node(edge.to) {
                let distance = earth_distance(from.lat, from.lon, to.lat, to.lon);
                if distance > 0.0 {
                    scale = scale.min(edge.weight() / distance);
                }
            }
        }
    }
    scale.max(0.0)
}

/// Same as [find_route], but with the heuristic multiplied by a precomputed `scale`,
/// which must not be greater than [heuristic_scale] of the graph.
pub fn find_route_scaled(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
    scale: f64,
) -> Result<Vec<i64>, SearchError> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut steps: usize = 0;

    let to_node = g
        .get_node(to_id)
        .ok_or(SearchError::InvalidReference(to_id))?;

    {
        let from_node = g
            .get_node(from_id)
            .ok_or(SearchError::InvalidReference(from_id))?;

        let initial_distance =
            scale * earth_distance(from_node.lat, from_node.lon, to_node.lat, to_node.lon);

        queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
            score: initial_distance,
        });
        known_costs.insert(from_id, 0.0);
    }

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            log::debug!("route {} -> {} found after {} steps", from_id, to_id, steps);
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(SearchError::StepLimitExceeded);
        }

        for edge in g.get_edges(item.at) {
            let neighbor_id = edge.to;

            // Check if the referred node exists
            if let Some(neighbor) = g.get_node(neighbor_id) {
                // Check if this is the cheapest way to the neighbor
                let neighbor_cost = item.cost + edge.weight();
                if neighbor_cost
                    >= known_costs
                        .get(&neighbor_id)
                        .copied()
                        .unwrap_or(f64::INFINITY)
                {
                    continue;
                }

                // Push the new item into the queue
                came_from.insert(neighbor_id, item.at);
                known_costs.insert(neighbor_id, neighbor_cost);
                queue.push(QueueItem {
                    at: neighbor_id,
                    cost: neighbor_cost,
                    score: neighbor_cost
                        + scale
                            * earth_distance(neighbor.lat, neighbor.lon, to_node.lat, to_node.lon),
                });
            }
        }
    }

    Err(SearchError::NoRoute {
        from: from_id,
        to: to_id,
    })
}
