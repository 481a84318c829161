//! Listing and parsing of the source filesystem inventory.

use std::process::Command;

use log::debug;

use tally_core::{Inventory, InventoryEntry};

use crate::error::HdfsError;

/// File rows in `hadoop fs -ls` output carry exactly these fields:
/// permissions, replication, owner, group, size, date, time, path.
const LISTING_FIELD_COUNT: usize = 8;
const SIZE_FIELD: usize = 4;

/// Configuration for the source lister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdfsConfig {
    /// Listing command and its fixed arguments; the input path is appended
    /// as the final argument at invocation time.
    pub ls_command: Vec<String>,
}

impl Default for HdfsConfig {
    fn default() -> Self {
        Self {
            ls_command: vec!["hadoop".to_string(), "fs".to_string(), "-ls".to_string()],
        }
    }
}

/// Lists the source filesystem by spawning the configured command.
#[derive(Debug, Clone)]
pub struct HdfsLister {
    config: HdfsConfig,
}

impl HdfsLister {
    pub fn new(config: HdfsConfig) -> Self {
        Self { config }
    }

    /// Run the listing command against `input_path` and parse its standard
    /// output into an inventory.
    pub fn list(&self, input_path: &str) -> Result<Inventory, HdfsError> {
        let (program, args) = self
            .config
            .ls_command
            .split_first()
            .ok_or(HdfsError::EmptyCommand)?;
        let rendered = render_command(&self.config.ls_command, input_path);

        debug!("running listing command: {rendered}");
        let output = Command::new(program)
            .args(args)
            .arg(input_path)
            .output()
            .map_err(|e| HdfsError::Spawn {
                command: rendered.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(HdfsError::CommandFailed {
                command: rendered,
                status: output.status,
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| HdfsError::Utf8 { command: rendered })?;
        let inventory = parse_listing(&stdout);
        debug!("source listing yielded {} entries", inventory.len());
        Ok(inventory)
    }
}

fn render_command(ls_command: &[String], input_path: &str) -> String {
    let mut parts: Vec<&str> = ls_command.iter().map(String::as_str).collect();
    parts.push(input_path);
    parts.join(" ")
}

/// Parse `ls`-style tabular output into an inventory.
///
/// Only lines with exactly eight whitespace-separated fields are file rows;
/// anything else is header or summary noise and contributes nothing. Rows
/// whose path is `.` or `..`, or whose size field is not a non-negative
/// integer, are skipped the same way.
fn parse_listing(stdout: &str) -> Inventory {
    let mut inventory = Inventory::new();
    for line in stdout.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != LISTING_FIELD_COUNT {
            continue;
        }

        let path = fields[LISTING_FIELD_COUNT - 1];
        if path == "." || path == ".." {
            continue;
        }

        let Ok(size) = fields[SIZE_FIELD].parse::<u64>() else {
            continue;
        };

        inventory.insert(InventoryEntry::new(path, size));
    }
    inventory
}
