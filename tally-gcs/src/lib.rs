//! # tally-gcs
//!
//! Destination inventory lister for Google Cloud Storage: bucket URL
//! normalization, file-backed OAuth credentials, and the list-objects call
//! that turns a bucket prefix into a [`tally_core::Inventory`].

pub mod auth;
pub mod error;
pub mod list;
pub mod location;

pub use auth::{StoredCredentials, TokenProvider, DEFAULT_SCOPE};
pub use error::GcsError;
pub use list::{GcsLister, GcsOptions, Pagination};
pub use location::ObjectLocation;
