//! Error types for tally-hdfs.

use std::process::ExitStatus;

use thiserror::Error;

/// All errors that can arise from listing the source filesystem.
#[derive(Debug, Error)]
pub enum HdfsError {
    /// The configured listing command had no program to run.
    #[error("listing command is empty")]
    EmptyCommand,

    /// The listing command could not be spawned.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The listing command ran but exited unsuccessfully. No partial
    /// inventory is returned.
    #[error("listing command `{command}` failed ({status})")]
    CommandFailed { command: String, status: ExitStatus },

    /// The listing command produced output that was not valid UTF-8.
    #[error("output of `{command}` was not valid UTF-8")]
    Utf8 { command: String },
}
