//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoCollection`, a `Collection` implementation backed by one
//! MongoDB collection per resource ("bootcamps", "courses", "users").
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Serialization strategy
//!
//! Documents are converted between `serde_json` and BSON. UUIDs and
//! timestamps are stored as strings, and the `id` field is mapped to
//! MongoDB's `_id` convention on the way in and back on the way out.
//!
//! # Query translation
//!
//! The filter AST becomes a `$and` of per-field expressions. Query-string
//! values carry no type, so equality matches both the native value and its
//! string form (`weeks=8` matches `8` and `"8"`).

use crate::core::error::StorageError;
use crate::core::field::FieldValue;
use crate::core::filter::{Filter, Predicate};
use crate::core::query::{Projection, SortDirection, SortKey};
use crate::core::store::{Collection, Document, FindOptions};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document as BsonDocument, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use serde_json::Value;
use uuid::Uuid;

const BACKEND: &str = "mongodb";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a JSON document into BSON, renaming `id` → `_id`.
fn json_to_document(json: Document) -> Result<BsonDocument, StorageError> {
    let bson_val = mongodb::bson::to_bson(&Value::Object(json)).map_err(|e| {
        StorageError::Serialization {
            message: format!("Failed to convert JSON to BSON: {}", e),
        }
    })?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => {
            return Err(StorageError::Serialization {
                message: "Expected BSON document, got non-object".to_string(),
            });
        }
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON document back into JSON, renaming `_id` → `id`.
fn document_to_json(mut doc: BsonDocument) -> Result<Document, StorageError> {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    match Bson::Document(doc).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        _ => Err(StorageError::Serialization {
            message: "Expected JSON object from BSON document".to_string(),
        }),
    }
}

fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

fn mongo_field(field: &str) -> &str {
    if field == "id" { "_id" } else { field }
}

fn native_bson(value: &FieldValue) -> Bson {
    match value {
        FieldValue::Boolean(b) => Bson::Boolean(*b),
        FieldValue::Integer { value, .. } => Bson::Int64(*value),
        FieldValue::Float { value, .. } => Bson::Double(*value),
        FieldValue::String(s) => Bson::String(s.clone()),
    }
}

/// The native value plus the text it was written as, when they differ
fn equality_variants(value: &FieldValue) -> Vec<Bson> {
    let mut variants = vec![native_bson(value)];
    if value.as_string().is_none() {
        variants.push(Bson::String(value.raw().into_owned()));
    }
    variants
}

fn predicate_to_bson(predicate: &Predicate) -> Bson {
    match predicate {
        Predicate::Eq(value) => {
            let mut variants = equality_variants(value);
            if variants.len() == 1 {
                variants.remove(0)
            } else {
                Bson::Document(doc! { "$in": variants })
            }
        }
        Predicate::Gt(value) => Bson::Document(doc! { "$gt": native_bson(value) }),
        Predicate::Gte(value) => Bson::Document(doc! { "$gte": native_bson(value) }),
        Predicate::Lt(value) => Bson::Document(doc! { "$lt": native_bson(value) }),
        Predicate::Lte(value) => Bson::Document(doc! { "$lte": native_bson(value) }),
        Predicate::In(values) => {
            let variants: Vec<Bson> = values.iter().flat_map(equality_variants).collect();
            Bson::Document(doc! { "$in": variants })
        }
    }
}

/// Translate the filter AST into a MongoDB query document
pub fn filter_to_bson(filter: &Filter) -> BsonDocument {
    let mut clauses: Vec<Bson> = filter
        .conditions
        .iter()
        .map(|c| {
            let mut clause = BsonDocument::new();
            clause.insert(mongo_field(&c.field), predicate_to_bson(&c.predicate));
            Bson::Document(clause)
        })
        .collect();

    if let Some(geo) = &filter.geo {
        let mut clause = BsonDocument::new();
        clause.insert(
            format!("{}.coordinates", geo.field),
            doc! {
                "$geoWithin": {
                    "$centerSphere": [[geo.longitude, geo.latitude], geo.radius]
                }
            },
        );
        clauses.push(Bson::Document(clause));
    }

    if clauses.is_empty() {
        doc! {}
    } else {
        doc! { "$and": clauses }
    }
}

pub fn sort_to_bson(keys: &[SortKey]) -> BsonDocument {
    let mut sort = BsonDocument::new();
    for key in keys {
        let direction = match key.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        sort.insert(mongo_field(&key.field), direction);
    }
    sort
}

pub fn projection_to_bson(projection: &Projection) -> BsonDocument {
    let mut fields = BsonDocument::new();
    match projection {
        Projection::Include(included) => {
            for field in included {
                fields.insert(mongo_field(field), 1);
            }
        }
        Projection::Exclude(excluded) => {
            for field in excluded {
                fields.insert(mongo_field(field), 0);
            }
        }
    }
    fields
}

fn query_error(context: &str, e: mongodb::error::Error) -> StorageError {
    StorageError::Query {
        backend: BACKEND.to_string(),
        message: format!("{}: {}", context, e),
    }
}

/// Index name of an E11000 error, if this is one
fn duplicate_key_index(e: &mongodb::error::Error) -> Option<String> {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000 => {
            Some(
                write_error
                    .message
                    .split("index: ")
                    .nth(1)
                    .and_then(|rest| rest.split_whitespace().next())
                    .map(|index| index.trim_end_matches("_1").to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            )
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// MongoCollection
// ---------------------------------------------------------------------------

/// Document collection backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use devcamper::storage::MongoCollection;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let db = client.database("devcamper");
/// let users = MongoCollection::new(&db, "users").with_unique_fields(["email"]);
/// users.ensure_indexes().await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoCollection {
    name: String,
    unique_fields: Vec<String>,
    collection: mongodb::Collection<BsonDocument>,
}

impl MongoCollection {
    pub fn new(database: &Database, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            collection: database.collection(&name),
            unique_fields: Vec::new(),
            name,
        }
    }

    pub fn with_unique_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Create a unique index per unique field
    pub async fn ensure_indexes(&self) -> Result<(), StorageError> {
        for field in &self.unique_fields {
            let mut keys = BsonDocument::new();
            keys.insert(field.as_str(), 1);
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.collection
                .create_index(model)
                .await
                .map_err(|e| query_error("Failed to create index", e))?;
        }
        Ok(())
    }

    fn write_error(&self, context: &str, e: mongodb::error::Error) -> StorageError {
        match duplicate_key_index(&e) {
            Some(field) => StorageError::Duplicate {
                collection: self.name.clone(),
                field,
            },
            None => query_error(context, e),
        }
    }
}

#[async_trait]
impl Collection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StorageError> {
        self.collection
            .count_documents(filter_to_bson(filter))
            .await
            .map_err(|e| query_error("Failed to count documents", e))
    }

    async fn find(&self, options: &FindOptions) -> Result<Vec<Document>, StorageError> {
        let mut find = self
            .collection
            .find(filter_to_bson(&options.filter))
            .sort(sort_to_bson(&options.sort))
            .skip(options.skip);
        if let Some(limit) = options.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if let Some(projection) = &options.projection {
            find = find.projection(projection_to_bson(projection));
        }

        let docs: Vec<BsonDocument> = find
            .await
            .map_err(|e| query_error("Failed to find documents", e))?
            .try_collect()
            .await
            .map_err(|e| query_error("Failed to collect documents", e))?;

        docs.into_iter().map(document_to_json).collect()
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Document>, StorageError> {
        self.collection
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| query_error("Failed to get document", e))?
            .map(document_to_json)
            .transpose()
    }

    async fn insert(&self, document: Document) -> Result<Document, StorageError> {
        let bson = json_to_document(document)?;
        self.collection
            .insert_one(bson.clone())
            .await
            .map_err(|e| self.write_error("Failed to insert document", e))?;
        document_to_json(bson)
    }

    async fn replace(&self, id: &Uuid, document: Document) -> Result<Option<Document>, StorageError> {
        let bson = json_to_document(document)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": uuid_bson(id) }, bson.clone())
            .await
            .map_err(|e| self.write_error("Failed to replace document", e))?;

        if result.matched_count == 0 {
            return Ok(None);
        }
        document_to_json(bson).map(Some)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StorageError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| query_error("Failed to delete document", e))?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let result = self
            .collection
            .delete_many(doc! {})
            .await
            .map_err(|e| query_error("Failed to delete documents", e))?;
        Ok(result.deleted_count)
    }
}
