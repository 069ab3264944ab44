//! Cache-first access to the ship catalog.
//!
//! [`CatalogService`] combines a [`Transport`], a [`CacheStore`] and a table
//! of per-resource locks. Every resource is looked up in the cache first and
//! only fetched when missing; a successful fetch is written back before it
//! is returned. A failed fetch leaves the cache untouched.

use std::path::PathBuf;
use std::sync::LazyLock;

use ctm_decode::{Decoder, Mesh};
use futures::stream::{FuturesUnordered, StreamExt};
use regex::Regex;
use serde_json::{Map, Value};

use crate::cache::{CacheStore, KeyLocks, ResourceKind};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{HttpClient, Transport};
use crate::schema::{self, MODEL_FIELD};
use crate::types::{DetailRecord, EntityId, SearchSummary};

/// Site origin that relative catalog URLs are resolved against.
pub const ORIGIN: &str = "https://robertsspaceindustries.com";

/// Maximum number of results requested per search.
const SEARCH_LIMIT: u32 = 20;

const SEARCH_OPERATION: &str = "GetShipList";

const SEARCH_DOCUMENT: &str = "query GetShipList($query: SearchQuery!) {\n  store(name: \"pledge\", browse: true) {\n    search(query: $query) {\n      resources {\n        ...RSIShipFragment\n        __typename\n      }\n      __typename\n    }\n    __typename\n  }\n}\n\nfragment RSIShipFragment on RSIShip {\n  id\n}";

/// Hologram reference embedded in a ship's detail page.
static MODEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"model_3d:\s*'([^']+)").expect("valid model pattern"));

/// Cache-first client for the ship catalog.
///
/// Construct one per host from a [`Config`] and share it by reference.
/// Concurrent requests for the same resource are serialized so only one of
/// them hits the network; requests for different resources run in parallel.
///
/// # Example
///
/// ```ignore
/// let catalog = CatalogService::new(&Config::default())?;
/// for ship in catalog.search("aurora").await? {
///     println!("{} {}", ship.id, ship.name);
/// }
/// ```
pub struct CatalogService<T: Transport = HttpClient> {
    transport: T,
    cache: CacheStore,
    locks: KeyLocks,
    origin: String,
}

impl CatalogService<HttpClient> {
    /// Create a service backed by a `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_transport(config, HttpClient::new()?))
    }
}

impl<T: Transport> CatalogService<T> {
    /// Create a service with a custom transport.
    #[must_use]
    pub fn with_transport(config: &Config, transport: T) -> Self {
        tracing::debug!(cache = %config.cache_directory.display(), "catalog service created");
        Self {
            transport,
            cache: CacheStore::new(&config.cache_directory),
            locks: KeyLocks::default(),
            origin: ORIGIN.to_string(),
        }
    }

    /// Set a custom origin for testing.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Search the catalog by ship name.
    ///
    /// The detail record of every hit is fetched concurrently (through the
    /// cache). Results are returned in completion order, not in the order the
    /// server listed them.
    ///
    /// # Errors
    ///
    /// Fails if the search request fails or if any detail fetch fails. The
    /// remaining detail fetches are cancelled on the first failure.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchSummary>> {
        let url = format!("{}/graphql", self.origin);
        let body = search_request(query).to_string().into_bytes();
        let response = self
            .transport
            .post_json(&url, &[("content-type", "application/json")], body)
            .await?;

        let ids = search_result_ids(response)?;
        tracing::debug!(query, hits = ids.len(), "search results");

        let mut pending = ids
            .iter()
            .map(|id| self.detail(id))
            .collect::<FuturesUnordered<_>>();

        let mut results = Vec::with_capacity(ids.len());
        while let Some(record) = pending.next().await {
            results.push(record?.summary());
        }
        Ok(results)
    }

    /// Get the detail record of a ship.
    ///
    /// On a cache miss the ship-matrix record is fetched, its detail page is
    /// scraped for a hologram reference, and the merged record is cached.
    ///
    /// # Errors
    ///
    /// Fails if a request fails, the upstream record is malformed, or the
    /// cache cannot be read or written.
    pub async fn detail(&self, id: &EntityId) -> Result<DetailRecord> {
        let kind = ResourceKind::DetailJson;
        let _guard = self.locks.lock(id, kind).await;

        if self.cache.has(id, kind) {
            tracing::debug!(%id, "detail cache hit");
            let text = self.cache.read_text(id, kind)?;
            let raw = serde_json::from_str::<Map<String, Value>>(&text).map_err(|e| {
                Error::InvalidData {
                    context: "cached detail record",
                    detail: e.to_string(),
                }
            })?;
            return schema::normalize(raw);
        }

        tracing::info!(%id, "downloading detail");
        let mut raw = self.fetch_ship_matrix(id).await?;
        let model = self.scrape_model(&raw).await?;
        if model.is_none() {
            tracing::debug!(%id, "detail page has no hologram");
        }
        raw.insert(MODEL_FIELD.to_string(), model.map_or(Value::Null, Value::String));

        let record = schema::normalize(raw)?;
        let json = serde_json::to_vec(record.raw()).map_err(|e| Error::InvalidData {
            context: "detail record",
            detail: e.to_string(),
        })?;
        self.cache.write(id, kind, &json)?;
        Ok(record)
    }

    /// Get the path of a ship's cached thumbnail, downloading it if needed.
    ///
    /// # Errors
    ///
    /// Fails if the download fails or the cache cannot be written.
    pub async fn thumbnail(&self, id: &EntityId, url: &str) -> Result<PathBuf> {
        self.download(id, ResourceKind::Thumbnail, url).await
    }

    /// Get the path of a ship's cached hologram, downloading it if needed.
    ///
    /// Without a URL nothing is fetched and the (possibly nonexistent) cache
    /// path is returned as is.
    ///
    /// # Errors
    ///
    /// Fails if the download fails or the cache cannot be written.
    pub async fn model(&self, id: &EntityId, url: Option<&str>) -> Result<PathBuf> {
        match url {
            Some(url) => self.download(id, ResourceKind::Model, url).await,
            None => {
                let path = self.cache.path(id, ResourceKind::Model);
                if !path.is_file() {
                    tracing::warn!(%id, "no model reference, nothing to download");
                }
                Ok(path)
            }
        }
    }

    /// Fetch and decode a ship's hologram in scene axes.
    ///
    /// Returns `None` if the ship has no hologram.
    ///
    /// # Errors
    ///
    /// Fails if any fetch fails or the model file cannot be decoded.
    pub async fn load_mesh(&self, id: &EntityId) -> Result<Option<Mesh>> {
        let record = self.detail(id).await?;
        let Some(url) = record.model_url.as_deref() else {
            tracing::warn!(%id, name = %record.name, "ship has no model");
            return Ok(None);
        };

        self.model(id, Some(url)).await?;
        let bytes = self.cache.read_bytes(id, ResourceKind::Model)?;
        let mesh = Decoder::new().decode(&bytes)?;
        tracing::info!(
            %id,
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "model loaded"
        );
        Ok(Some(mesh))
    }

    /// Absolute URL of a ship's page on the website.
    #[must_use]
    pub fn website_url(&self, record: &DetailRecord) -> Option<String> {
        record.url.as_deref().map(|url| self.resolve_url(url))
    }

    /// Remove everything from the cache.
    ///
    /// # Errors
    ///
    /// Fails if the cache root does not exist or cannot be removed.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Resolve a possibly relative catalog URL against the origin.
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("https://") || url.starts_with("http://") {
            url.to_string()
        } else if let Some(rest) = url.strip_prefix("//") {
            format!("https://{rest}")
        } else if url.starts_with('/') {
            format!("{}{url}", self.origin)
        } else {
            format!("{}/{url}", self.origin)
        }
    }

    async fn download(&self, id: &EntityId, kind: ResourceKind, url: &str) -> Result<PathBuf> {
        let _guard = self.locks.lock(id, kind).await;

        if self.cache.has(id, kind) {
            tracing::debug!(%id, ?kind, "cache hit");
            return Ok(self.cache.path(id, kind));
        }

        let url = self.resolve_url(url);
        tracing::info!(%id, ?kind, %url, "downloading");
        let data = self.transport.get(&url, &[], &[]).await?;
        self.cache.write(id, kind, &data)
    }

    async fn fetch_ship_matrix(&self, id: &EntityId) -> Result<Map<String, Value>> {
        let url = format!("{}/ship-matrix/index", self.origin);
        let mut response = self
            .transport
            .get_json(&url, &[("id", id.as_str())], &[])
            .await?;

        match response.pointer_mut("/data/0").map(Value::take) {
            Some(Value::Object(record)) => Ok(record),
            _ => Err(Error::InvalidData {
                context: "ship matrix response",
                detail: format!("no record for id {id}"),
            }),
        }
    }

    /// Look for a hologram reference on the ship's detail page.
    async fn scrape_model(&self, raw: &Map<String, Value>) -> Result<Option<String>> {
        let Some(page) = raw.get("url").and_then(Value::as_str) else {
            return Ok(None);
        };

        let url = self.resolve_url(page);
        let html = self.transport.get(&url, &[], &[]).await?;
        Ok(find_model_reference(&String::from_utf8_lossy(&html)))
    }
}

/// Build the GraphQL search request body.
fn search_request(query: &str) -> Value {
    serde_json::json!([{
        "operationName": SEARCH_OPERATION,
        "variables": {
            "query": {
                "limit": SEARCH_LIMIT,
                "ships": { "name": query }
            }
        },
        "query": SEARCH_DOCUMENT
    }])
}

/// Extract the ship ids from a search response.
fn search_result_ids(mut response: Value) -> Result<Vec<EntityId>> {
    let resources = match response
        .pointer_mut("/0/data/store/search/resources")
        .map(Value::take)
    {
        Some(Value::Array(resources)) => resources,
        Some(Value::Null) => Vec::new(),
        _ => {
            return Err(Error::InvalidData {
                context: "search response",
                detail: "missing search resources".to_string(),
            });
        }
    };

    resources
        .iter()
        .map(|resource| {
            resource
                .get("id")
                .ok_or_else(|| Error::InvalidData {
                    context: "search response",
                    detail: "resource without id".to_string(),
                })
                .and_then(EntityId::from_json)
        })
        .collect()
}

/// First hologram reference in a detail page.
fn find_model_reference(html: &str) -> Option<String> {
    MODEL_PATTERN
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
