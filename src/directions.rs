// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::bearing::{bearing, bearing_delta};
use crate::{turn_direction, Coordinate, EdgeInfo, Graph, Turn};

/// Street name used for edges without a name, or when no edge connects two nodes.
pub const DEFAULT_STREET_NAME: &str = "sidewalk";

/// Text of the last [DirectionStep] of every route.
pub const ARRIVAL_TEXT: &str = "Arrive at your destination";

/// Minimal change of bearing (in degrees, either way) between consecutive
/// edges which may warrant a new instruction, even without a change of street.
const DIRECTION_CHANGE_THRESHOLD: f64 = 25.0;

/// A single turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionStep {
    /// Human-readable instruction, e.g. "Turn left onto Washington Avenue".
    pub text: String,

    /// Distance to cover (in rounded graph weight units, usually meters)
    /// after following this instruction, before the next one applies.
    pub distance: u64,

    /// Index into the route's node list where this instruction applies.
    pub node_index: usize,
}

impl DirectionStep {
    fn new(text: String, node_index: usize) -> Self {
        Self {
            text,
            distance: 0,
            node_index,
        }
    }
}

/// Converts an accumulated, unrounded distance into a [DirectionStep::distance].
///
/// Halves are rounded to the nearest even number.
fn round_distance(distance: f64) -> u64 {
    if distance < 0.0 {
        log::warn!("negative accumulated distance {} clamped to 0", distance);
        return 0;
    }
    distance.round_ties_even() as u64
}

/// Street name and length of an edge, with missing data replaced by defaults.
fn describe_edge<'a>(info: Option<EdgeInfo<'a>>) -> (&'a str, f64) {
    match info {
        Some(info) => (
            info.name.unwrap_or(DEFAULT_STREET_NAME),
            info.length.unwrap_or(0.0),
        ),
        None => (DEFAULT_STREET_NAME, 0.0),
    }
}

/// Text of the instruction for a node where a change of street or direction was detected.
/// Going straight along the same street is not worth an instruction.
fn instruction_text(turn: Turn, incoming_street: &str, outgoing_street: &str) -> Option<String> {
    if incoming_street != outgoing_street {
        Some(format!("{} onto {}", turn, outgoing_street))
    } else if turn != Turn::Straight {
        Some(format!("{} on {}", turn, outgoing_street))
    } else {
        None
    }
}

/// Accumulates traversed distance and flushes it into the most recent step.
struct StepBuilder {
    directions: Vec<DirectionStep>,
    accumulated: f64,
}

impl StepBuilder {
    fn new(first: DirectionStep) -> Self {
        Self {
            directions: vec![first],
            accumulated: 0.0,
        }
    }

    fn travel(&mut self, distance: f64) {
        self.accumulated += distance;
    }

    /// Closes the most recent step with the distance accumulated since it was added,
    /// and starts a new one.
    fn push(&mut self, next: DirectionStep) {
        self.flush();
        self.directions.push(next);
    }

    fn flush(&mut self) {
        let distance = round_distance(self.accumulated);
        if let Some(last) = self.directions.last_mut() {
            last.distance = distance;
        }
        self.accumulated = 0.0;
    }

    fn finish(mut self, arrival_index: usize) -> Vec<DirectionStep> {
        self.flush();
        self.directions
            .push(DirectionStep::new(ARRIVAL_TEXT.to_string(), arrival_index));
        self.directions
    }
}

/// Converts a route (a sequence of node ids, as returned by [find_route](crate::find_route))
/// into turn-by-turn directions.
///
/// A new instruction is issued whenever the street name changes, or when the
/// direction of travel changes by more than 25° and that change amounts to an actual turn.
/// Every instruction carries the distance to the next one; the final
/// "Arrive at your destination" instruction always has a distance of zero.
///
/// Routes with fewer than 2 nodes produce no directions. Data problems never
/// cause a failure: consecutive nodes without an edge are treated as an unnamed
/// sidewalk of zero length, and unknown nodes produce neutral turn instructions.
pub fn synthesize_directions(g: &Graph, path: &[i64]) -> Vec<DirectionStep> {
    if path.len() < 2 {
        return Vec::default();
    }

    let coordinate = |id: i64| match g.get_node(id) {
        Some(node) => node.coordinate(),
        None => {
            log::warn!("route references unknown node {}", id);
            Coordinate::new(f64::NAN, f64::NAN)
        }
    };

    let (first_street, _) = describe_edge(g.edge_info(path[0], path[1]));
    let mut steps = StepBuilder::new(DirectionStep::new(format!("Start on {}", first_street), 0));
    let mut last_bearing: Option<f64> = None;

    for i in 1..path.len() - 1 {
        let (incoming_street, incoming_length) = describe_edge(g.edge_info(path[i - 1], path[i]));
        let (outgoing_street, _) = describe_edge(g.edge_info(path[i], path[i + 1]));
        steps.travel(incoming_length);

        let prev = coordinate(path[i - 1]);
        let current = coordinate(path[i]);
        let next = coordinate(path[i + 1]);
        let current_bearing = bearing(current, next).value();

        let is_direction_change = last_bearing.is_some_and(|last| {
            bearing_delta(last, current_bearing).abs() > DIRECTION_CHANGE_THRESHOLD
        });

        if incoming_street != outgoing_street || is_direction_change {
            let turn = turn_direction(prev, current, next).value();
            if let Some(text) = instruction_text(turn, incoming_street, outgoing_street) {
                steps.push(DirectionStep::new(text, i));
            }
        }

        last_bearing = Some(current_bearing);
    }

    let (_, last_length) = describe_edge(g.edge_info(path[path.len() - 2], path[path.len() - 1]));
    steps.travel(last_length);
    steps.finish(path.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Node};

    /// Builds a graph where consecutive `nodes` are connected with edges
    /// of the given name and length.
    fn chain(nodes: &[(i64, f64, f64)], edges: &[(Option<&str>, f64)]) -> Graph {
        assert_eq!(nodes.len(), edges.len() + 1);
        let mut g = Graph::new();
        for &(id, lat, lon) in nodes {
            g.set_node(Node {
                id,
                lat,
                lon,
                elevation: None,
            });
        }
        for (pair, &(name, length)) in nodes.windows(2).zip(edges) {
            let mut edge = Edge::new(pair[1].0, length);
            edge.name = name.map(str::to_string);
            g.add_edge(pair[0].0, edge);
        }
        g
    }

    fn step(text: &str, distance: u64, node_index: usize) -> DirectionStep {
        DirectionStep {
            text: text.to_string(),
            distance,
            node_index,
        }
    }

    fn path_of(nodes: &[(i64, f64, f64)]) -> Vec<i64> {
        nodes.iter().map(|&(id, _, _)| id).collect()
    }

    #[test]
    fn short_paths() {
        let g = chain(&[(1, 0.0, 0.0), (2, 0.0, 0.001)], &[(Some("Main"), 111.0)]);
        assert!(synthesize_directions(&g, &[]).is_empty());
        assert!(synthesize_directions(&g, &[1]).is_empty());
    }

    #[test]
    fn single_edge() {
        let g = chain(&[(1, 0.0, 0.0), (2, 0.0, 0.001)], &[(Some("Main"), 111.4)]);
        assert_eq!(
            synthesize_directions(&g, &[1, 2]),
            vec![step("Start on Main", 111, 0), step(ARRIVAL_TEXT, 0, 1)],
        );
    }

    #[test]
    fn straight_along_one_street() {
        let nodes = [
            (1, 39.7400, -105.2200),
            (2, 39.7410, -105.2200),
            (3, 39.7420, -105.2200),
            (4, 39.7430, -105.2200),
        ];
        let g = chain(
            &nodes,
            &[(Some("Washington Avenue"), 111.2), (Some("Washington Avenue"), 111.2), (Some("Washington Avenue"), 111.2)],
        );
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![
                step("Start on Washington Avenue", 334, 0),
                step(ARRIVAL_TEXT, 0, 3),
            ],
        );
    }

    #[test]
    fn street_change_without_turn() {
        // Slight bend of ~10°, but a different street name
        let nodes = [(1, 39.7400, -105.2200), (2, 39.7410, -105.2200), (3, 39.7420, -105.21975)];
        let g = chain(&nodes, &[(Some("Ford Street"), 111.0), (Some("10th Street"), 113.0)]);
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![
                step("Start on Ford Street", 111, 0),
                step("Continue straight onto 10th Street", 113, 1),
                step(ARRIVAL_TEXT, 0, 2),
            ],
        );
    }

    #[test]
    fn turn_onto_another_street() {
        // North, then east
        let nodes = [(1, 39.7400, -105.2200), (2, 39.7410, -105.2200), (3, 39.7410, -105.2187)];
        let g = chain(&nodes, &[(Some("Ford Street"), 111.0), (Some("12th Street"), 111.0)]);
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![
                step("Start on Ford Street", 111, 0),
                step("Turn right onto 12th Street", 111, 1),
                step(ARRIVAL_TEXT, 0, 2),
            ],
        );
    }

    #[test]
    fn turn_along_the_same_street() {
        // North, north, then west - all on one street. The turn happens at node 2,
        // where the incoming bearing is known.
        let nodes = [
            (1, 39.7400, -105.2200),
            (2, 39.7410, -105.2200),
            (3, 39.7420, -105.2200),
            (4, 39.7420, -105.2213),
        ];
        let g = chain(&nodes, &[(None, 111.0), (None, 111.0), (None, 111.0)]);
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![
                step("Start on sidewalk", 222, 0),
                step("Turn left on sidewalk", 111, 2),
                step(ARRIVAL_TEXT, 0, 3),
            ],
        );
    }

    #[test]
    fn gradual_curve_has_no_instructions() {
        // Bearings of 0°, 15° and 30°: each bend is below the direction change threshold
        let nodes = [
            (1, 39.740000, -105.220000),
            (2, 39.741000, -105.220000),
            (3, 39.741966, -105.219663),
            (4, 39.742832, -105.219013),
        ];
        let g = chain(&nodes, &[(Some("Main"), 111.0), (Some("Main"), 111.0), (Some("Main"), 111.0)]);
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![step("Start on Main", 333, 0), step(ARRIVAL_TEXT, 0, 3)]
        );
    }

    #[test]
    fn straight_on_same_street_is_suppressed() {
        assert_eq!(instruction_text(Turn::Straight, "Main", "Main"), None);
        assert_eq!(
            instruction_text(Turn::Straight, "Main", "Elm"),
            Some("Continue straight onto Elm".to_string())
        );
        assert_eq!(
            instruction_text(Turn::Left, "Main", "Main"),
            Some("Turn left on Main".to_string())
        );
        assert_eq!(
            instruction_text(Turn::SharpRight, "sidewalk", "Elm"),
            Some("Make a sharp right onto Elm".to_string())
        );
    }

    #[test]
    fn missing_edge_is_a_zero_length_sidewalk() {
        let nodes = [(1, 39.7400, -105.2200), (2, 39.7410, -105.2200), (3, 39.7420, -105.2200)];
        let mut g = chain(&nodes, &[(Some("Main"), 111.0), (Some("Main"), 111.0)]);
        g.delete_edge(2, 3);
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![
                step("Start on Main", 111, 0),
                step("Continue straight onto sidewalk", 0, 1),
                step(ARRIVAL_TEXT, 0, 2),
            ],
        );
    }

    #[test]
    fn unknown_nodes_degrade_gracefully() {
        let nodes = [(1, 39.7400, -105.2200), (2, 39.7410, -105.2200)];
        let g = chain(&nodes, &[(Some("Main"), 111.0)]);
        let directions = synthesize_directions(&g, &[1, 2, 99]);
        assert_eq!(
            directions,
            vec![
                step("Start on Main", 111, 0),
                step("Continue onto sidewalk", 0, 1),
                step(ARRIVAL_TEXT, 0, 2),
            ],
        );
    }

    #[test]
    fn distances_round_half_to_even() {
        assert_eq!(round_distance(0.5), 0);
        assert_eq!(round_distance(1.5), 2);
        assert_eq!(round_distance(2.5), 2);
        assert_eq!(round_distance(2.51), 3);
        assert_eq!(round_distance(-3.0), 0);
    }

    #[test]
    fn distances_add_up() {
        // A meandering route with mixed street names
        let nodes = [
            (1, 39.7400, -105.2200),
            (2, 39.7410, -105.2200),
            (3, 39.7410, -105.2187),
            (4, 39.7420, -105.2180),
            (5, 39.7425, -105.2190),
            (6, 39.7435, -105.2190),
            (7, 39.7435, -105.2170),
        ];
        let edges = [
            (Some("Ford Street"), 111.3),
            (Some("12th Street"), 112.6),
            (Some("12th Street"), 126.4),
            (None, 101.2),
            (None, 111.7),
            (Some("Arapahoe Street"), 171.9),
        ];
        let g = chain(&nodes, &edges);
        let path = path_of(&nodes);
        let directions = synthesize_directions(&g, &path);

        let first = directions.first().unwrap();
        assert_eq!(first.node_index, 0);
        assert!(first.text.starts_with("Start on "));

        let last = directions.last().unwrap();
        assert_eq!(last.node_index, path.len() - 1);
        assert_eq!(last.text, ARRIVAL_TEXT);
        assert_eq!(last.distance, 0);

        assert!(directions.len() <= path.len() + 1);
        assert!(directions.windows(2).all(|w| w[0].node_index < w[1].node_index));

        let total: f64 = edges.iter().map(|&(_, length)| length).sum();
        let reported: u64 = directions.iter().map(|s| s.distance).sum();
        let tolerance = (directions.len() - 1) as f64;
        assert!(
            (reported as f64 - total).abs() <= tolerance,
            "reported {} vs total {}",
            reported,
            total
        );
    }

    #[test]
    fn parallel_edges_use_lowest_key() {
        let nodes = [(1, 39.7400, -105.2200), (2, 39.7410, -105.2200), (3, 39.7420, -105.2200)];
        let mut g = chain(&nodes, &[(Some("Main"), 111.0), (Some("Main"), 111.0)]);
        g.add_edge(2, Edge::new(3, 50.0).named("Shortcut"));
        assert_eq!(
            synthesize_directions(&g, &path_of(&nodes)),
            vec![step("Start on Main", 222, 0), step(ARRIVAL_TEXT, 0, 2)],
        );
    }

    #[test]
    fn serializes_like_the_endpoint() {
        let s = serde_json::to_string(&step("Start on Main", 12, 0)).unwrap();
        assert_eq!(s, r#"{"text":"Start on Main","distance":12,"node_index":0}"#);
    }
}
