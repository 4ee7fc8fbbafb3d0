//! In-memory contract graph.
//!
//! Construction happens through [`GraphBuilder`], which enforces id uniqueness
//! and endpoint existence. [`GraphBuilder::build`] freezes the result into a
//! [`ContractGraph`] that only exposes read access and the graph algorithms.
//! Storage is a `petgraph` [`DiGraph`](petgraph::graph::DiGraph) with
//! parallel edges allowed.

mod algo;
mod store;

pub use store::{ContractGraph, GraphBuilder};
