//! Destination bucket URL normalization.

use std::fmt;

use crate::error::GcsError;

/// A bucket and object prefix extracted from a `gs://bucket/prefix` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub prefix: String,
}

impl ObjectLocation {
    /// Parse a bucket-qualified URL.
    ///
    /// The bucket is the URL authority; the prefix is the URL path with
    /// exactly one leading and one trailing slash stripped. Emptiness is
    /// validated before any slicing, so `gs://bucket` and `gs://bucket/`
    /// fail with [`GcsError::InvalidPath`] rather than an out-of-bounds
    /// access.
    pub fn parse(url: &str) -> Result<Self, GcsError> {
        let rest = url
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(|| invalid(url, "expected scheme://bucket/prefix"))?;

        let (bucket, path) = match rest.split_once('/') {
            Some((bucket, path)) => (bucket, path),
            None => (rest, ""),
        };
        if bucket.is_empty() {
            return Err(invalid(url, "missing bucket"));
        }

        let prefix = path.strip_prefix('/').unwrap_or(path);
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        if prefix.is_empty() {
            return Err(invalid(url, "empty object prefix"));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.prefix)
    }
}

fn invalid(url: &str, reason: &str) -> GcsError {
    GcsError::InvalidPath {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
