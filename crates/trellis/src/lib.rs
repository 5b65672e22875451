//! Trellis - project, epic and issue tracking over JSONL snapshots.
//!
//! This crate provides the `trellis` CLI and the pieces behind it: the
//! repository configuration, the snapshot store, and text/JSON output. All
//! hierarchy, dependency and progress computations live in `trellis_core`.

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod snapshot;
