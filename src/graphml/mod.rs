// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading and saving [Graphs](crate::Graph) as [GraphML](http://graphml.graphdrawing.org/)
//! documents, in the flavor produced by OSMnx: node positions under the `y` and `x`
//! attributes, and parallel edges told apart by their `id`.

mod error;
mod names;
mod reader;
mod writer;

pub use error::Error;
pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, FileFormat, Options,
};
pub use writer::{write, write_to_file};
