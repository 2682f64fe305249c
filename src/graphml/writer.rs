// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::graphml::{names, Error};
use crate::Graph;

const GRAPHML_NAMESPACE: &str = "http://graphml.graphdrawing.org/xmlns";

/// Attribute declarations of written files, as (id, domain, name).
const KEYS: &[(&str, &str, &str)] = &[
    ("d0", "node", "y"),
    ("d1", "node", "x"),
    ("d2", "node", "elevation"),
    ("d3", "edge", "length"),
    ("d4", "edge", "name"),
    ("d5", "edge", "obstacle"),
];

struct GraphWriter<W: Write>(quick_xml::Writer<W>);

impl<W: Write> GraphWriter<W> {
    fn start(&mut self, element: BytesStart<'_>) -> Result<(), Error> {
        self.0.write_event(Event::Start(element))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), Error> {
        self.0.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, element: BytesStart<'_>) -> Result<(), Error> {
        self.0.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn data(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.start(BytesStart::new("data").with_attributes([("key", key)]))?;
        self.0.write_event(Event::Text(BytesText::new(value)))?;
        self.end("data")
    }

    fn write_graph(&mut self, g: &Graph) -> Result<(), Error> {
        self.0
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.start(BytesStart::new("graphml").with_attributes([("xmlns", GRAPHML_NAMESPACE)]))?;

        for &(id, domain, name) in KEYS {
            self.empty(BytesStart::new("key").with_attributes([
                ("id", id),
                ("for", domain),
                ("attr.name", name),
                ("attr.type", "string"),
            ]))?;
        }

        self.start(BytesStart::new("graph").with_attributes([("edgedefault", "directed")]))?;

        for node in g.iter() {
            let id = node.id.to_string();
            self.start(BytesStart::new("node").with_attributes([("id", id.as_str())]))?;
            self.data("d0", &node.lat.to_string())?;
            self.data("d1", &node.lon.to_string())?;
            if let Some(elevation) = node.elevation {
                self.data("d2", &elevation.to_string())?;
            }
            self.end("node")?;
        }

        for node in g.iter() {
            let from = node.id.to_string();
            for edge in g.get_edges(node.id) {
                let to = edge.to.to_string();
                let key = edge.key.to_string();
                self.start(BytesStart::new("edge").with_attributes([
                    ("source", from.as_str()),
                    ("target", to.as_str()),
                    ("id", key.as_str()),
                ]))?;
                if let Some(length) = edge.length {
                    self.data("d3", &length.to_string())?;
                }
                if let Some(ref name) = edge.name {
                    self.data("d4", &names::format(name))?;
                }
                if edge.obstacle {
                    self.data("d5", "True")?;
                }
                self.end("edge")?;
            }
        }

        self.end("graph")?;
        self.end("graphml")
    }
}

/// Writes a [Graph] as a directed GraphML document, which can be loaded back
/// with [add_features_from_io](super::add_features_from_io).
pub fn write<W: Write>(g: &Graph, writer: W) -> Result<(), Error> {
    let mut w = GraphWriter(quick_xml::Writer::new_with_indent(writer, b' ', 2));
    w.write_graph(g)?;
    w.0.into_inner().flush()?;
    Ok(())
}

/// Writes a [Graph] as an uncompressed GraphML file at the provided path.
pub fn write_to_file<P: AsRef<Path>>(g: &Graph, path: P) -> Result<(), Error> {
    let f = File::create(path)?;
    write(g, io::BufWriter::new(f))
}
