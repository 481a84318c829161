//! # tally-hdfs
//!
//! Source inventory lister. Spawns an external `hadoop fs -ls` style command
//! against the input path and parses its tabular output into a
//! [`tally_core::Inventory`].

pub mod error;
pub mod list;

pub use error::HdfsError;
pub use list::{HdfsConfig, HdfsLister};
