//! High-level types for catalog data.
//!
//! These types are the normalized view of upstream records. The upstream
//! JSON is kept alongside so fields this crate does not model are still
//! reachable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Identifier of a catalog item (ship).
///
/// Upstream sends ids as strings or integers. The id is also the cache
/// directory name, so it must be non-empty, must not be `.` or `..`, and
/// must not contain path separators or NUL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id, validating that it is usable as a path component.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0']);
        if valid {
            Ok(Self(id))
        } else {
            Err(Error::InvalidData {
                context: "entity id",
                detail: format!("{id:?} cannot be used as an id"),
            })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an id from an upstream JSON string or integer.
    pub(crate) fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            Value::Number(n) if n.is_u64() => Self::new(n.to_string()),
            other => Err(Error::InvalidData {
                context: "entity id",
                detail: format!("expected a string or integer, got {other}"),
            }),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Physical dimensions in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub height: Option<f64>,
    pub length: Option<f64>,
    pub beam: Option<f64>,
}

/// Crew size range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Crew {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

/// Full metadata for one catalog item.
///
/// Built by a schema adapter from the upstream JSON (see
/// [`crate::schema`]). The JSON itself is retained and is what gets cached.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub id: EntityId,
    pub name: String,
    pub manufacturer: Option<String>,
    /// Upstream `type` (e.g. "combat", "exploration").
    pub role: Option<String>,
    pub focus: Option<String>,
    /// Size class (e.g. "small", "capital").
    pub size: Option<String>,
    pub dimensions: Dimensions,
    pub crew: Crew,
    /// Detail page path or URL.
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Downloadable OpenCTM hologram, if the item has one.
    pub model_url: Option<String>,
    pub(crate) raw: Map<String, Value>,
}

impl DetailRecord {
    /// The upstream JSON this record was built from.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Look up an upstream field this type does not model.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model_url.is_some()
    }

    /// Project the fields shown in search results.
    #[must_use]
    pub fn summary(&self) -> SearchSummary {
        SearchSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            url: self.url.clone(),
        }
    }
}

/// Lightweight search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    pub id: EntityId,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub url: Option<String>,
}

impl From<&DetailRecord> for SearchSummary {
    fn from(record: &DetailRecord) -> Self {
        record.summary()
    }
}
