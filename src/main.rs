// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use wayfare::{graphml, Coordinate, GraphStore, RouteRequest, RouteResponse, RouteService};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] graphml::Error);

#[derive(Parser)]
struct Cli {
    /// Increase logging verbosity (may be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find a route with directions over a single GraphML file
    Route {
        /// The path to the GraphML file
        graph_file: PathBuf,

        /// Latitude of the start point
        start_lat: f64,

        /// Longitude of the start point
        start_lon: f64,

        /// Latitude of the end point
        end_lat: f64,

        /// Longitude of the end point
        end_lon: f64,
    },

    /// Generate weighted graph variants for all preference combinations
    Generate {
        /// The path to the base GraphML file
        base_file: PathBuf,

        /// Directory to save the variants into
        out_dir: PathBuf,
    },

    /// Answer JSON route requests from stdin, one per line
    ServeStdin {
        /// Directory with generated graph variants
        graph_dir: PathBuf,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    colog::default_builder().filter_level(level).init();

    match cli.command {
        Command::Route {
            graph_file,
            start_lat,
            start_lon,
            end_lat,
            end_lon,
        } => {
            let g = load_graph(&graph_file)?;
            let service = RouteService::new(Arc::new(wayfare::Snapshot::new(g)));
            let route = service.find_route(
                Coordinate::new(start_lat, start_lon),
                Coordinate::new(end_lat, end_lon),
            )?;
            println!("{}", serde_json::to_string_pretty(&route)?);
        }

        Command::Generate { base_file, out_dir } => {
            let g = load_graph(&base_file)?;
            let written = wayfare::weighting::generate_variants(&g, &out_dir)?;
            log::info!("generated {} graph variants", written.len());
        }

        Command::ServeStdin { graph_dir } => {
            let store = GraphStore::new(graph_dir);
            let mut stdout = io::stdout().lock();
            for line in io::stdin().lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<RouteRequest>(&line) {
                    Ok(request) => wayfare::handle_request(&store, request),
                    Err(e) => RouteResponse::Error {
                        error: format!("invalid request: {}", e),
                    },
                };
                serde_json::to_writer(&mut stdout, &response)?;
                writeln!(stdout)?;
                stdout.flush()?;
            }
        }
    }

    Ok(())
}

fn load_graph<P: AsRef<Path>>(path: P) -> Result<wayfare::Graph, GraphLoadError> {
    let mut g = wayfare::Graph::default();
    let options = graphml::Options::default();
    match graphml::add_features_from_file(&mut g, &options, path.as_ref()) {
        Ok(()) => Ok(g),
        Err(e) => Err(GraphLoadError(PathBuf::from(path.as_ref()), e)),
    }
}
