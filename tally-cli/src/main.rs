//! Tally — HDFS to GCS transfer audit.
//!
//! Lists a source path on HDFS (via an external listing command) and a
//! destination prefix on GCS, reconciles the two inventories, and reports
//! files that never arrived or arrived with a different size. Read-only and
//! advisory: nothing is copied, repaired, or deleted.
//!
//! # Usage
//!
//! ```text
//! tally --inputpath /data/run1 --outputpath gs://bucket/run1
//! tally --inputpath /data/run1 --outputpath gs://bucket/run1 --paginate --json
//! ```

mod audit;

use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use colored::Colorize;

use audit::AuditConfig;
use tally_gcs::Pagination;
use tally_hdfs::HdfsConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    about = "Audit an HDFS-to-GCS transfer by comparing file inventories",
    long_about = None,
)]
struct Cli {
    /// The path on HDFS to treat as the source.
    #[arg(long)]
    inputpath: String,

    /// The destination location on GCS (gs://bucket/prefix).
    #[arg(long)]
    outputpath: String,

    /// Listing command and its fixed arguments, comma separated; the input
    /// path is appended as the final argument.
    #[arg(
        long = "ls_command",
        value_delimiter = ',',
        default_values_t = HdfsConfig::default().ls_command,
    )]
    ls_command: Vec<String>,

    /// Path to the stored OAuth token cache
    /// [default: ~/.google_apis/.tally.credentials].
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Path to the OAuth client-secret file
    /// [default: ~/.google_apis/secrets.json].
    #[arg(long)]
    secret: Option<PathBuf>,

    /// Follow listing continuation tokens instead of the historical
    /// single-page listing.
    #[arg(long)]
    paginate: bool,

    /// Emit the report as JSON instead of the fixed text block.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            std::process::exit(0);
        }
        Err(err) => {
            // Flag errors print usage to stdout and exit 1.
            println!("{err}");
            std::process::exit(1);
        }
    };

    env_logger::init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let credentials = match cli.credentials {
        Some(path) => path,
        None => audit::default_credentials_path()?,
    };
    let secret = match cli.secret {
        Some(path) => path,
        None => audit::default_secret_path()?,
    };

    let config = AuditConfig {
        input_path: cli.inputpath,
        output_path: cli.outputpath,
        ls_command: cli.ls_command,
        credentials,
        secret,
        pagination: if cli.paginate {
            Pagination::Full
        } else {
            Pagination::SinglePage
        },
        json: cli.json,
    };

    let report = audit::run(&config)?;
    print!("{report}");
    Ok(())
}
