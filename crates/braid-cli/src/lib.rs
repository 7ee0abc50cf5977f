//! CLI logic for the braid layout tool.
//!
//! Reads a JSON chart description, assembles the refinement graph,
//! runs the refiner, and writes the final node geometry as JSON.

mod args;
mod config;

pub use args::Args;
pub use config::{CliConfig, ConfigError};

use std::{fs, io};

use log::info;
use serde::Serialize;
use thiserror::Error;

use braid::{Refiner, weave};

/// The main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid chart description: {0}")]
    Chart(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Final geometry of one node, as written to the output file.
#[derive(Debug, Serialize)]
struct PlacedNode {
    id: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Run the braid CLI application
///
/// Reads the chart from the input file, refines the layout, and writes
/// the placed nodes to the output file.
///
/// # Errors
///
/// Returns `CliError` for file I/O errors, configuration loading
/// errors, and malformed input JSON.
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Refining chart layout"
    );

    let cli_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let chart: weave::ChartData = serde_json::from_str(&source)?;

    let graph = weave::assemble(&chart, cli_config.weave());
    let mut refiner = Refiner::configure(graph, cli_config.simulation().clone());
    refiner.run(args.steps);

    let placed: Vec<PlacedNode> = refiner
        .graph()
        .nodes()
        .map(|node| PlacedNode {
            id: node.id().to_string(),
            x: node.x(),
            y: node.y(),
            width: node.size().width(),
            height: node.size().height(),
        })
        .collect();
    fs::write(&args.output, serde_json::to_string_pretty(&placed)?)?;

    info!(node_count = placed.len(), output_file = args.output; "Layout exported successfully");

    Ok(())
}
