//! Domain types for inventory reconciliation.
//!
//! An [`Inventory`] is a path-keyed collection of size records from one
//! storage system. Paths are matched by exact string comparison; iteration is
//! path-sorted so downstream output is reproducible.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One file or object as reported by its storage system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    /// Logical path, used as the comparison key.
    pub path: String,
    /// Declared size in bytes.
    pub size: u64,
}

impl InventoryEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Path-keyed inventory from a single storage system.
///
/// Duplicate inserts for the same path overwrite (last wins), mirroring the
/// uniqueness guarantee of the upstream listing itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    entries: BTreeMap<String, InventoryEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: InventoryEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    pub fn get(&self, path: &str) -> Option<&InventoryEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.values()
    }
}

impl FromIterator<InventoryEntry> for Inventory {
    fn from_iter<I: IntoIterator<Item = InventoryEntry>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for entry in iter {
            inventory.insert(entry);
        }
        inventory
    }
}

impl IntoIterator for Inventory {
    type Item = InventoryEntry;
    type IntoIter = std::collections::btree_map::IntoValues<String, InventoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation result
// ---------------------------------------------------------------------------

/// Outcome of comparing a source inventory against a destination inventory.
///
/// No entry appears in both sequences: an entry missing from the destination
/// is never size-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Present in source, absent from destination. Path-ordered.
    pub missing: Vec<InventoryEntry>,
    /// Present on both sides with differing declared sizes (source entry
    /// retained). Path-ordered.
    pub size_mismatched: Vec<InventoryEntry>,
    /// Cardinality of the source inventory.
    pub source_count: usize,
    /// Cardinality of the destination inventory.
    pub destination_count: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
