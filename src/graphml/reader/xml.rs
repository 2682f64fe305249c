// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;

use quick_xml::events::{BytesStart, Event};

use super::model::{self, Domain, Element};
use crate::graphml::Error;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Text content currently being collected.
#[derive(Debug)]
enum Capture {
    Nothing,
    Data { key: String, text: String },
    Default(String),
}

/// Reader reads GraphML [Elements](Element) from an XML file.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
    current: Option<Element>,
    capture: Capture,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self {
            parser,
            eof: false,
            current: None,
            capture: Capture::Nothing,
        }
    }

    fn next_element(&mut self) -> Result<Option<Element>, Error> {
        while !self.eof {
            match self.parser.read_event()? {
                Event::Start(start) => match start.local_name().as_ref() {
                    b"key" => self.current = parse_key(&start)?.map(Element::Key),
                    b"default" => {
                        if let Some(Element::Key(_)) = self.current {
                            self.capture = Capture::Default(String::default());
                        }
                    }
                    b"graph" => return parse_graph(&start).map(Some),
                    b"node" => self.current = Some(Element::Node(parse_node(&start)?)),
                    b"edge" => self.current = Some(Element::Edge(parse_edge(&start)?)),
                    b"data" => {
                        let key = required_attribute(&start, "data", "key")?;
                        self.capture = Capture::Data {
                            key,
                            text: String::default(),
                        };
                    }
                    _ => {}
                },

                Event::Empty(start) => match start.local_name().as_ref() {
                    b"key" => {
                        if let Some(key) = parse_key(&start)? {
                            return Ok(Some(Element::Key(key)));
                        }
                    }
                    b"graph" => return parse_graph(&start).map(Some),
                    b"node" => return Ok(Some(Element::Node(parse_node(&start)?))),
                    b"edge" => return Ok(Some(Element::Edge(parse_edge(&start)?))),
                    b"data" => {
                        let key = required_attribute(&start, "data", "key")?;
                        store_data(&mut self.current, key, String::default());
                    }
                    _ => {}
                },

                Event::Text(text) => match self.capture {
                    Capture::Data { text: ref mut buf, .. } | Capture::Default(ref mut buf) => {
                        buf.push_str(&text.unescape()?)
                    }
                    Capture::Nothing => {}
                },

                Event::CData(data) => match self.capture {
                    Capture::Data { text: ref mut buf, .. } | Capture::Default(ref mut buf) => {
                        buf.push_str(&String::from_utf8_lossy(&data))
                    }
                    Capture::Nothing => {}
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"data" => {
                        if let Capture::Data { key, text } =
                            std::mem::replace(&mut self.capture, Capture::Nothing)
                        {
                            store_data(&mut self.current, key, text);
                        }
                    }
                    b"default" => {
                        if let Capture::Default(text) =
                            std::mem::replace(&mut self.capture, Capture::Nothing)
                        {
                            if let Some(Element::Key(ref mut key)) = self.current {
                                key.default = Some(text);
                            }
                        }
                    }
                    b"key" | b"node" | b"edge" => {
                        if let Some(element) = self.current.take() {
                            return Ok(Some(element));
                        }
                    }
                    _ => {}
                },

                Event::Eof => self.eof = true,

                _ => {}
            }
        }

        Ok(None)
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Element, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => None,
            Err(e) => {
                // Stop after the first error - the parser state is unreliable
                self.eof = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

/// Attaches a `<data>` value to the node or edge being read.
/// Graph-level data is not needed and is dropped.
fn store_data(current: &mut Option<Element>, key: String, value: String) {
    match current {
        Some(Element::Node(n)) => {
            n.data.insert(key, value);
        }
        Some(Element::Edge(e)) => {
            e.data.insert(key, value);
        }
        _ => {}
    }
}

fn attribute(start: &BytesStart<'_>, name: &str) -> Result<Option<String>, Error> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(
    start: &BytesStart<'_>,
    element: &'static str,
    name: &'static str,
) -> Result<String, Error> {
    attribute(start, name)?.ok_or(Error::MissingAttribute {
        element,
        attribute: name,
    })
}

/// Parses a `<key>` declaration. Keys with an unknown domain are skipped.
fn parse_key(start: &BytesStart<'_>) -> Result<Option<model::Key>, Error> {
    let id = required_attribute(start, "key", "id")?;
    let domain = attribute(start, "for")?;
    let domain = match domain.as_deref().map(Domain::parse) {
        None => Domain::All,
        Some(Some(domain)) => domain,
        Some(None) => {
            log::warn!("key {:?} has an unknown domain {:?} - ignoring", id, domain);
            return Ok(None);
        }
    };
    let name = attribute(start, "attr.name")?.unwrap_or_else(|| id.clone());

    Ok(Some(model::Key {
        id,
        domain,
        name,
        default: None,
    }))
}

fn parse_graph(start: &BytesStart<'_>) -> Result<Element, Error> {
    let directed = attribute(start, "edgedefault")?.map_or(true, |d| d != "undirected");
    Ok(Element::Graph { directed })
}

fn parse_node(start: &BytesStart<'_>) -> Result<model::Node, Error> {
    Ok(model::Node {
        id: required_attribute(start, "node", "id")?,
        data: HashMap::default(),
    })
}

fn parse_edge(start: &BytesStart<'_>) -> Result<model::Edge, Error> {
    Ok(model::Edge {
        id: attribute(start, "id")?,
        from: required_attribute(start, "edge", "source")?,
        to: required_attribute(start, "edge", "target")?,
        directed: attribute(start, "directed")?.map(|d| d == "true"),
        data: HashMap::default(),
    })
}
