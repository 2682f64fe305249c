// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::graphml::Error;
use crate::Graph;

mod graph_builder;
mod model;
mod xml;

/// Format of the input GraphML file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Unknown format - guess the format based on the content
    Unknown,

    /// Force uncompressed GraphML
    Xml,

    /// Force GraphML with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// Force GraphML with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format of a file based on its first few bytes.
    pub fn detect(head: &[u8]) -> Self {
        if head.starts_with(&[0x1f, 0x8b]) {
            Self::XmlGz
        } else if head.starts_with(b"BZh") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for loading GraphML data into a [Graph].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            file_format: FileFormat::Unknown,
        }
    }
}

/// Parse GraphML nodes and edges from a reader into a [Graph] as per the provided [Options].
///
/// Nodes must have `y` (latitude) and `x` (longitude) attributes, and may have an `elevation`.
/// Edges may have `length`, `name` and `obstacle` attributes. The `id` of an edge is used
/// as its [key](crate::Edge::key). Other attributes are ignored.
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn add_features_from_io<R: io::Read>(
    g: &mut Graph,
    options: &Options,
    reader: R,
) -> Result<(), Error> {
    let mut b = io::BufReader::new(reader);
    let file_format = match options.file_format {
        FileFormat::Unknown => {
            let detected = FileFormat::detect(b.fill_buf()?);
            log::debug!("detected graph file format: {:?}", detected);
            detected
        }
        file_format => file_format,
    };

    match file_format {
        FileFormat::Unknown | FileFormat::Xml => {
            GraphBuilder::new(g).add_elements(xml::Reader::from_io(b))
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(b);
            let b = io::BufReader::new(d);
            GraphBuilder::new(g).add_elements(xml::Reader::from_io(b))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(b);
            let b = io::BufReader::new(d);
            GraphBuilder::new(g).add_elements(xml::Reader::from_io(b))
        }
    }
}

/// Parse GraphML nodes and edges from a file at the provided path into a [Graph]
/// as per the provided [Options].
pub fn add_features_from_file<P: AsRef<Path>>(
    g: &mut Graph,
    options: &Options,
    path: P,
) -> Result<(), Error> {
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse GraphML nodes and edges from a static buffer into a [Graph]
/// as per the provided [Options].
pub fn add_features_from_buffer(
    g: &mut Graph,
    options: &Options,
    data: &[u8],
) -> Result<(), Error> {
    let file_format = match options.file_format {
        FileFormat::Unknown => FileFormat::detect(data),
        file_format => file_format,
    };

    if file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        GraphBuilder::new(g).add_elements(xml::Reader::from_buffer(data))
    } else {
        // Wrap the buffer in a cursor and use the IO path
        let cursor = io::Cursor::new(data);
        add_features_from_io(g, &Options { file_format }, cursor)
    }
}
