// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::graphml::{names, Error};
use crate::{Edge, Graph, Node};

use super::model::{self, Domain, Element};

/// Helper object used for storing state related to converting [GraphML elements](Element)
/// into a [Graph].
pub(super) struct GraphBuilder<'a> {
    g: &'a mut Graph,
    keys: HashMap<String, model::Key>,
    directed: bool,
    pending_edges: Vec<model::Edge>,
}

impl<'a> GraphBuilder<'a> {
    pub(super) fn new(g: &'a mut Graph) -> Self {
        Self {
            g,
            keys: HashMap::default(),
            directed: true,
            pending_edges: Vec::default(),
        }
    }

    /// Add all elements from the provided iterator.
    ///
    /// Edges are only added once all nodes are known, as GraphML
    /// doesn't require nodes to be declared before edges.
    pub(super) fn add_elements<I>(&mut self, elements: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Result<Element, Error>>,
    {
        for element in elements {
            self.add_element(element?)?;
        }

        for e in std::mem::take(&mut self.pending_edges) {
            self.add_edge(e)?;
        }

        Ok(())
    }

    fn add_element(&mut self, element: Element) -> Result<(), Error> {
        match element {
            Element::Key(k) => {
                self.keys.insert(k.id.clone(), k);
            }
            Element::Graph { directed } => self.directed = directed,
            Element::Node(n) => self.add_node(n)?,
            Element::Edge(e) => self.pending_edges.push(e),
        }
        Ok(())
    }

    /// Maps raw `<data>` values (keyed by key ids) to attribute names,
    /// filling in declared defaults.
    fn attributes(&self, domain: Domain, data: HashMap<String, String>) -> HashMap<String, String> {
        let mut attributes: HashMap<String, String> = self
            .keys
            .values()
            .filter(|k| k.domain.applies_to(domain))
            .filter_map(|k| Some((k.name.clone(), k.default.clone()?)))
            .collect();

        for (key_id, value) in data {
            let name = match self.keys.get(&key_id) {
                Some(key) => key.name.clone(),
                None => key_id,
            };
            attributes.insert(name, value);
        }

        attributes
    }

    fn add_node(&mut self, n: model::Node) -> Result<(), Error> {
        let invalid = |reason: &str| Error::InvalidNode {
            id: n.id.clone(),
            reason: reason.to_string(),
        };

        let id = match n.id.trim().parse::<i64>() {
            Ok(0) | Err(_) => return Err(invalid("id must be a non-zero integer")),
            Ok(id) => id,
        };

        let attributes = self.attributes(Domain::Node, n.data);
        let lat = attributes
            .get("y")
            .and_then(|v| parse_number(v))
            .ok_or_else(|| invalid("missing or invalid latitude (\"y\")"))?;
        let lon = attributes
            .get("x")
            .and_then(|v| parse_number(v))
            .ok_or_else(|| invalid("missing or invalid longitude (\"x\")"))?;

        let elevation = match attributes.get("elevation") {
            None => None,
            Some(raw) => {
                let elevation = parse_number(raw);
                if elevation.is_none() {
                    log::warn!("node {}: ignoring invalid elevation {:?}", id, raw);
                }
                elevation
            }
        };

        self.g.set_node(Node {
            id,
            lat,
            lon,
            elevation,
        });
        Ok(())
    }

    fn add_edge(&mut self, e: model::Edge) -> Result<(), Error> {
        let invalid = |reason: &str| Error::InvalidEdge {
            from: e.from.clone(),
            to: e.to.clone(),
            reason: reason.to_string(),
        };

        let (from, to) = match (e.from.trim().parse::<i64>(), e.to.trim().parse::<i64>()) {
            (Ok(from), Ok(to)) if from != 0 && to != 0 => (from, to),
            _ => return Err(invalid("node ids must be non-zero integers")),
        };

        if self.g.get_node(from).is_none() || self.g.get_node(to).is_none() {
            log::warn!("edge {} -> {} references an unknown node - skipping", from, to);
            return Ok(());
        }

        let attributes = self.attributes(Domain::Edge, e.data);

        let length = match attributes.get("length") {
            None => None,
            Some(raw) => Some(parse_number(raw).ok_or_else(|| invalid("invalid length"))?),
        };

        let key = match e.id.as_deref().map(|id| id.trim().parse::<u32>()) {
            Some(Ok(key)) => key,
            _ => 0,
        };

        let edge = Edge {
            to,
            key,
            length,
            name: attributes.get("name").and_then(|n| names::parse(n)),
            obstacle: attributes.get("obstacle").is_some_and(|o| is_truthy(o)),
        };

        if !e.directed.unwrap_or(self.directed) {
            self.g.add_edge(
                to,
                Edge {
                    to: from,
                    ..edge.clone()
                },
            );
        }
        self.g.add_edge(from, edge);

        Ok(())
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Interprets a boolean-like attribute value.
fn is_truthy(s: &str) -> bool {
    !matches!(s.trim(), "" | "False" | "false" | "0")
}
