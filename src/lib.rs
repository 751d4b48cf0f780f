//! costtree: assemble company hierarchies from flat records and roll up
//! travel costs bottom-up.
//!
//! Layers, innermost first:
//! - [`domain`]: records, forest assembly, cost aggregation, report projection (no I/O)
//! - [`application`]: payload ingestion and the report service
//! - [`infrastructure`]: record sources (HTTP and files)
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
