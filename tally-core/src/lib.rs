//! # tally-core
//!
//! Inventory types, the reconciler, and report rendering for the `tally`
//! transfer audit tool.
//!
//! Build one [`Inventory`] per side, hand both to [`reconcile`], and render
//! the result with [`report::render`] or [`report::report_json`].

pub mod reconcile;
pub mod report;
pub mod types;

pub use reconcile::reconcile;
pub use types::{Inventory, InventoryEntry, ReconciliationResult};
