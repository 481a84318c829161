//! Rendering of reconciliation results.
//!
//! The text form is fixed and order-sensitive: destination count, source
//! count, size-mismatched paths under their header, a blank separator, then
//! missing paths under their header. Consumers diff this output across runs,
//! so it must stay byte-stable for a given result.

use serde::Serialize;

use crate::types::{InventoryEntry, ReconciliationResult};

/// Render the fixed text report.
pub fn render(result: &ReconciliationResult) -> String {
    let mismatched = join_paths(&result.size_mismatched);
    let missing = join_paths(&result.missing);

    // An empty list still contributes its (empty) line, so the block shape
    // does not change with the result contents.
    format!(
        "GCS Number of items:{gcs}\n\
         HDFS Number of items:{hdfs}\n\
         The following items on GCS have incorrect size:\n\
         {mismatched}\n\
         \n\
         The following items are not in gcs:\n\
         {missing}\n",
        gcs = result.destination_count,
        hdfs = result.source_count,
    )
}

fn join_paths(entries: &[InventoryEntry]) -> String {
    entries
        .iter()
        .map(|e| e.path.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ReportJson {
    summary: SummaryJson,
    size_mismatched: Vec<String>,
    missing: Vec<String>,
}

#[derive(Serialize)]
struct SummaryJson {
    gcs_items: usize,
    hdfs_items: usize,
}

/// Render the machine-readable report.
pub fn report_json(result: &ReconciliationResult) -> Result<String, serde_json::Error> {
    let payload = ReportJson {
        summary: SummaryJson {
            gcs_items: result.destination_count,
            hdfs_items: result.source_count,
        },
        size_mismatched: result
            .size_mismatched
            .iter()
            .map(|e| e.path.clone())
            .collect(),
        missing: result.missing.iter().map(|e| e.path.clone()).collect(),
    };
    serde_json::to_string_pretty(&payload)
}
