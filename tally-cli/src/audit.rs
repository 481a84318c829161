//! Sequential audit flow: list HDFS, list GCS, reconcile, render.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use tally_core::{reconcile, report};
use tally_gcs::{GcsLister, GcsOptions, ObjectLocation, Pagination, StoredCredentials};
use tally_hdfs::{HdfsConfig, HdfsLister};

/// Fully resolved configuration for one audit run.
///
/// Built once from the CLI flags; components receive it explicitly instead
/// of reading process-global state.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub input_path: String,
    pub output_path: String,
    pub ls_command: Vec<String>,
    pub credentials: PathBuf,
    pub secret: PathBuf,
    pub pagination: Pagination,
    pub json: bool,
}

/// Default token cache location: `~/.google_apis/.tally.credentials`.
pub fn default_credentials_path() -> Result<PathBuf> {
    Ok(config_base()?.join(".tally.credentials"))
}

/// Default client-secret location: `~/.google_apis/secrets.json`.
pub fn default_secret_path() -> Result<PathBuf> {
    Ok(config_base()?.join("secrets.json"))
}

fn config_base() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".google_apis"))
}

/// Run the audit and return the rendered report.
///
/// The two inventories are fetched sequentially, source first, then
/// destination. Any listing failure aborts the run before a report is
/// produced.
pub fn run(config: &AuditConfig) -> Result<String> {
    let source = HdfsLister::new(HdfsConfig {
        ls_command: config.ls_command.clone(),
    })
    .list(&config.input_path)
    .context("failed to list source inventory")?;
    info!(
        "listed {} source entries from {}",
        source.len(),
        config.input_path
    );

    let location = ObjectLocation::parse(&config.output_path)
        .context("failed to resolve destination location")?;
    let provider = StoredCredentials::new(&config.credentials, &config.secret);
    let destination = GcsLister::new(
        provider,
        GcsOptions {
            pagination: config.pagination,
            ..GcsOptions::default()
        },
    )
    .list(&location)
    .with_context(|| format!("failed to list destination inventory at {location}"))?;
    info!(
        "listed {} destination objects from {location}",
        destination.len()
    );

    let result = reconcile(source, destination);
    if config.json {
        let mut json = report::report_json(&result).context("failed to serialize JSON report")?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(report::render(&result))
    }
}
