//! Source-to-destination inventory comparison.

use crate::types::{Inventory, ReconciliationResult};

/// Compare a source inventory against a destination inventory.
///
/// Every source entry whose path is absent from the destination lands in
/// `missing`; every source entry present on both sides with a differing
/// declared size lands in `size_mismatched`. Entries present only on the
/// destination are not reported: the audit asks "did everything from the
/// source arrive", not for a symmetric difference.
///
/// Both inventories are consumed; output ordering follows the source
/// inventory's path order.
pub fn reconcile(source: Inventory, destination: Inventory) -> ReconciliationResult {
    let source_count = source.len();
    let destination_count = destination.len();

    let mut missing = Vec::new();
    let mut size_mismatched = Vec::new();

    for entry in source {
        match destination.get(&entry.path) {
            None => missing.push(entry),
            Some(dest) if dest.size != entry.size => size_mismatched.push(entry),
            Some(_) => {}
        }
    }

    ReconciliationResult {
        missing,
        size_mismatched,
        source_count,
        destination_count,
    }
}
