//! Core types for the braid stream-graph layout refiner.
//!
//! This crate holds the foundational vocabulary shared by the layout
//! pipeline: geometric primitives, interned identifiers, and the
//! node/link graph model that the refiner mutates in place.

pub mod geometry;
pub mod graph;
pub mod identifier;
