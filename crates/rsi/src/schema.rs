//! Adapters from upstream record shapes to [`DetailRecord`].
//!
//! The catalog has exposed ship metadata in more than one shape over time.
//! Each shape gets its own adapter; all of them normalize into the same
//! `DetailRecord`. Records fetched by this crate are always stored in the
//! canonical [`Schema::ShipMatrix`] shape, the other adapters exist so older
//! cache entries stay readable.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{Crew, DetailRecord, Dimensions, EntityId};

/// Field the scraped hologram reference is merged into.
pub const MODEL_FIELD: &str = "hologram_3d";

/// Known upstream record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// REST ship-matrix record, snake_case, numbers often sent as strings,
    /// with the scraped `hologram_3d` merged in. Canonical.
    ShipMatrix,
    /// Legacy GraphQL `RSIShip` fragment, camelCase.
    GraphQlShip,
}

impl Schema {
    /// Guess the shape of a record.
    #[must_use]
    pub fn detect(raw: &Map<String, Value>) -> Self {
        let graphql = raw.contains_key("__typename")
            || raw.contains_key("minCrew")
            || raw.contains_key("maxCrew");
        if graphql {
            Self::GraphQlShip
        } else {
            Self::ShipMatrix
        }
    }

    /// Build a record from upstream JSON of this shape.
    pub fn normalize(self, raw: Map<String, Value>) -> Result<DetailRecord> {
        let id = raw
            .get("id")
            .ok_or_else(|| missing("id"))
            .and_then(EntityId::from_json)?;
        let name = text(&raw, &["name"]).ok_or_else(|| missing("name"))?;

        let mut record = DetailRecord {
            id,
            name,
            manufacturer: text(&raw, &["manufacturer", "name"]),
            role: text(&raw, &["type"]),
            focus: text(&raw, &["focus"]),
            size: text(&raw, &["size"]),
            dimensions: Dimensions {
                height: number(&raw, &["height"]),
                length: number(&raw, &["length"]),
                beam: number(&raw, &["beam"]),
            },
            crew: Crew::default(),
            url: text(&raw, &["url"]),
            thumbnail_url: None,
            model_url: text(&raw, &[MODEL_FIELD]),
            raw: Map::new(),
        };

        match self {
            Self::ShipMatrix => {
                record.crew = Crew {
                    min: count(&raw, &["min_crew"]),
                    max: count(&raw, &["max_crew"]),
                };
                record.thumbnail_url = raw
                    .get("media")
                    .and_then(Value::as_array)
                    .and_then(|media| media.first())
                    .and_then(|m| lookup(m, &["images", "subscribers_vault_thumbnail"]))
                    .and_then(as_text);
            }
            Self::GraphQlShip => {
                record.crew = Crew {
                    min: count(&raw, &["minCrew"]),
                    max: count(&raw, &["maxCrew"]),
                };
                record.thumbnail_url = text(&raw, &["media", "thumbnail", "storeSmall"])
                    .or_else(|| text(&raw, &["thumbnail"]));
            }
        }

        record.raw = raw;
        Ok(record)
    }
}

/// Normalize a record of any known shape.
pub fn normalize(raw: Map<String, Value>) -> Result<DetailRecord> {
    Schema::detect(&raw).normalize(raw)
}

fn missing(field: &str) -> Error {
    Error::InvalidData {
        context: "detail record",
        detail: format!("missing field `{field}`"),
    }
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

fn field<'a>(raw: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    lookup(raw.get(*first)?, rest)
}

/// Non-empty string, or a number rendered as text.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(raw: &Map<String, Value>, path: &[&str]) -> Option<String> {
    field(raw, path).and_then(as_text)
}

/// Number sent either as a JSON number or as a numeric string.
fn number(raw: &Map<String, Value>, path: &[&str]) -> Option<f64> {
    match field(raw, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn count(raw: &Map<String, Value>, path: &[&str]) -> Option<u32> {
    match field(raw, path)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
