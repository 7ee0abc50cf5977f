//! Braid - force-directed layout refinement for stream-graph diagrams.
//!
//! A stream graph draws named bands flowing left to right through time,
//! splitting, merging, and carrying labels. This crate takes such a
//! graph (assembled from tabular records by [`weave`], or built
//! directly) and relaxes its vertical arrangement with a small force
//! simulation while the horizontal axis stays pinned to time.
//!
//! # Examples
//!
//! ```rust
//! use braid::{
//!     config::{SimulationOptions, Viewport},
//!     sim::Refiner,
//!     weave::{self, ChartData, WeaveOptions},
//! };
//!
//! let chart: ChartData = serde_json::from_str(
//!     r#"{"streams": [{"name": "main", "start": 1900, "end": 1910}]}"#,
//! )
//! .expect("Failed to parse chart");
//!
//! let graph = weave::assemble(&chart, &WeaveOptions::default());
//! let options = SimulationOptions::default()
//!     .with_viewport(Viewport::bounded(2_000_000.0, 600.0));
//!
//! let mut refiner = Refiner::configure(graph, options);
//! refiner.run(0);
//!
//! for node in refiner.graph().nodes() {
//!     println!("{} at ({}, {})", node.id(), node.x(), node.y());
//! }
//! ```

pub mod config;
pub mod sim;
pub mod weave;

pub use braid_core::{geometry, graph, identifier};

pub use config::{Parameter, SimulationOptions, Viewport};
pub use sim::Refiner;
