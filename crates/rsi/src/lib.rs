//! Async client for the RSI ship catalog.
//!
//! This crate searches the ship catalog, fetches ship detail records,
//! thumbnails and OpenCTM holograms, and keeps everything in a disk cache
//! keyed by ship id so each resource is downloaded at most once.
//!
//! # Design principles
//!
//! - **Cache-first**: A resource on disk is always used as is; there is no
//!   expiry
//! - **Host-owned**: No global state. The host builds a [`CatalogService`]
//!   from a [`Config`] and passes it around by reference
//! - **Runtime-light**: Only `tokio::sync` is required; the host picks the
//!   runtime
//!
//! # Example
//!
//! ```ignore
//! use rsi::{CatalogService, Config};
//!
//! let catalog = CatalogService::new(&Config::default())?;
//! let hits = catalog.search("mercury").await?;
//! if let Some(hit) = hits.first() {
//!     if let Some(mesh) = catalog.load_mesh(&hit.id).await? {
//!         println!("{} triangles", mesh.face_count());
//!     }
//! }
//! ```

mod cache;
mod catalog;
mod config;
mod error;
mod http;
mod schema;
mod types;

pub use cache::{CacheStore, ResourceKind};
pub use catalog::{CatalogService, ORIGIN};
pub use config::{Config, DEFAULT_CACHE_DIRECTORY};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use http::{FetchFuture, HttpClient, JsonFuture, Pair, Transport, USER_AGENT, with_query};
pub use schema::{MODEL_FIELD, Schema, normalize};
pub use types::{Crew, DetailRecord, Dimensions, EntityId, SearchSummary};

// Re-export the decoder types returned by `CatalogService::load_mesh`.
pub use ctm_decode::{Axes, Mesh};
