//! Entity trait shared by every stored resource type

use crate::core::error::{EntityError, ValidationError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Base trait for all entities in the system.
///
/// Entities are persisted as JSON documents whose identity field is `id`
/// and whose creation timestamp is `createdAt`; listings sort on the latter
/// by default.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name, also the collection name (e.g., "bootcamps")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "bootcamp")
    fn resource_name_singular() -> &'static str;

    /// Name used in client-facing messages (e.g., "Bootcamp")
    fn display_name() -> &'static str;

    /// Fields whose values must be unique across the collection
    fn unique_fields() -> &'static [&'static str] {
        &[]
    }

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;
}

/// Parse an identifier taken from a URL path.
///
/// A malformed id is reported the same way as a missing resource.
pub fn parse_id(raw: &str) -> Result<Uuid, EntityError> {
    Uuid::parse_str(raw).map_err(|_| EntityError::InvalidId {
        value: raw.to_string(),
    })
}

/// Copy the client-writable fields of a payload onto a document.
///
/// Other keys are dropped, so clients cannot set ids, owners or derived
/// fields. An explicit `null` clears the field.
pub fn merge_writable(doc: &mut Map<String, Value>, payload: Value, writable: &[&str]) {
    let Value::Object(fields) = payload else {
        return;
    };
    for (key, value) in fields {
        if !writable.contains(&key.as_str()) {
            continue;
        }
        if value.is_null() {
            doc.remove(&key);
        } else {
            doc.insert(key, value);
        }
    }
}

/// `createdAt` in one fixed-width UTC form (`2024-01-01T00:00:00.000Z`)
///
/// Stored timestamps then sort the same as text in every backend. Any
/// RFC 3339 offset is accepted on the way in.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The current time, already in stored form
    pub fn now() -> String {
        format(&Utc::now())
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Deserialize a merged document; type mismatches are client errors
pub fn decode_document<T: DeserializeOwned>(doc: Map<String, Value>) -> Result<T, ValidationError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| ValidationError::InvalidJson {
        message: e.to_string(),
    })
}
