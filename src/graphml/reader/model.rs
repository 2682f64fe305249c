// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Which kind of GraphML element a [Key] describes, as per its `for` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Graph,
    Node,
    Edge,
    All,
}

impl Domain {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "graph" => Some(Self::Graph),
            "node" => Some(Self::Node),
            "edge" => Some(Self::Edge),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn applies_to(self, other: Domain) -> bool {
        self == Self::All || self == other
    }
}

/// Represents a [GraphML attribute declaration](http://graphml.graphdrawing.org/primer/graphml-primer.html#AttributesDefinition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub id: String,
    pub domain: Domain,
    pub name: String,
    pub default: Option<String>,
}

/// Represents a `<node>` element. `data` maps key ids to raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub data: HashMap<String, String>,
}

/// Represents an `<edge>` element. `data` maps key ids to raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    pub directed: Option<bool>,
    pub data: HashMap<String, String>,
}

/// Union over all GraphML elements relevant for building a [Graph](crate::Graph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Key(Key),
    Graph { directed: bool },
    Node(Node),
    Edge(Edge),
}
