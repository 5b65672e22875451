//! Trellis core - dependency and hierarchy computations for project tracking.
//!
//! This crate holds the pure logic of the tracker: given projects, epics,
//! issues and the dependency relation already loaded into memory, it derives
//! blocked/ready state, status counts, story point metrics, dependency
//! ordering, a flattened display tree with rollups, and the rules for
//! drag-and-drop reparenting and reordering.
//!
//! Nothing here performs I/O or keeps state between calls. Callers own the
//! data and re-invoke these functions after every change.

#![forbid(unsafe_code)]

pub mod counts;
pub mod domain;
pub mod error;
pub mod format;
pub mod graph;
pub mod hierarchy;
pub mod metrics;
pub mod reorder;
pub mod reparent;
pub mod rollup;
pub mod status;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use error::ValidationError;
