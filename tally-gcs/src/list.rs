//! Object listing against the storage JSON API.

use log::{debug, warn};
use serde::Deserialize;

use tally_core::{Inventory, InventoryEntry};

use crate::auth::TokenProvider;
use crate::error::{api_err, GcsError};
use crate::location::ObjectLocation;

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com/storage/v1";

/// How much of a large listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    /// Issue a single list call, matching the historical tool. Buckets
    /// larger than one page are truncated; a warning is logged when a
    /// continuation token is dropped.
    #[default]
    SinglePage,
    /// Follow `nextPageToken` until the listing is exhausted.
    Full,
}

/// Configuration for the destination lister.
#[derive(Debug, Clone)]
pub struct GcsOptions {
    pub pagination: Pagination,
    /// Storage API root. Overridable for tests.
    pub endpoint: String,
}

impl Default for GcsOptions {
    fn default() -> Self {
        Self {
            pagination: Pagination::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// One object record from the list response. Only the fields reconciliation
/// needs are decoded; everything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectRecord {
    pub name: String,
    /// The API encodes object sizes as JSON strings.
    #[serde(default, deserialize_with = "size_field")]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectRecord>,
    next_page_token: Option<String>,
}

fn size_field<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Text(String),
        Number(u64),
    }

    match Size::deserialize(deserializer)? {
        Size::Text(text) => text.parse().map_err(serde::de::Error::custom),
        Size::Number(number) => Ok(number),
    }
}

/// Lists objects under a bucket prefix with an injected token provider.
pub struct GcsLister<P: TokenProvider> {
    provider: P,
    options: GcsOptions,
    agent: ureq::Agent,
}

impl<P: TokenProvider> GcsLister<P> {
    pub fn new(provider: P, options: GcsOptions) -> Self {
        Self {
            provider,
            options,
            agent: ureq::agent(),
        }
    }

    /// List all objects under `location` and return them as an inventory.
    ///
    /// A listing that yields zero objects overall fails with
    /// [`GcsError::EmptyListing`].
    pub fn list(&self, location: &ObjectLocation) -> Result<Inventory, GcsError> {
        let token = self.provider.access_token()?;

        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.fetch_page(location, &token, page_token.as_deref())?;
            records.extend(page.items);

            page_token = page.next_page_token;
            match (self.options.pagination, &page_token) {
                (_, None) => break,
                (Pagination::Full, Some(_)) => continue,
                (Pagination::SinglePage, Some(_)) => {
                    warn!(
                        "listing of {location} continues past one page; \
                         remaining objects are not fetched (enable pagination to follow)"
                    );
                    break;
                }
            }
        }

        if records.is_empty() {
            return Err(GcsError::EmptyListing {
                location: location.to_string(),
            });
        }

        debug!("destination listing yielded {} objects", records.len());
        Ok(records
            .into_iter()
            .map(|record| InventoryEntry::new(record.name, record.size))
            .collect())
    }

    fn fetch_page(
        &self,
        location: &ObjectLocation,
        token: &str,
        page_token: Option<&str>,
    ) -> Result<ListResponse, GcsError> {
        let url = format!("{}/b/{}/o", self.options.endpoint, location.bucket);
        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {token}"))
            .query("prefix", &location.prefix);
        if let Some(page_token) = page_token {
            request = request.query("pageToken", page_token);
        }

        debug!("listing page of {location}");
        let response = request.call().map_err(api_err)?;
        response
            .into_json()
            .map_err(|e| GcsError::Decode { source: e })
    }
}
