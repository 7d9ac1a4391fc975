//! Collection trait over JSON documents
//!
//! A [`Collection`] is one named, queryable set of documents. The listing
//! middleware and relation expansion only speak to this trait, so any
//! backend that can filter, sort, skip, limit and project plugs in.

use crate::core::error::StorageError;
use crate::core::field::{compare_json, get_path};
use crate::core::filter::Filter;
use crate::core::query::{Projection, SortDirection, SortKey};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use uuid::Uuid;

/// A stored document; always carries a string `id`
pub type Document = Map<String, Value>;

/// Everything a single fetch needs
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub filter: Filter,
    pub projection: Option<Projection>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    pub fn projection(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A named, queryable store of documents of one logical type
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name (e.g., "bootcamps")
    fn name(&self) -> &str;

    /// Number of documents matching `filter`
    async fn count(&self, filter: &Filter) -> Result<u64, StorageError>;

    /// Filter, sort, skip, limit, then project
    async fn find(&self, options: &FindOptions) -> Result<Vec<Document>, StorageError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Document>, StorageError>;

    /// Insert a new document; unique fields are enforced
    async fn insert(&self, document: Document) -> Result<Document, StorageError>;

    /// Replace a document, returning `None` when it does not exist
    async fn replace(&self, id: &Uuid, document: Document) -> Result<Option<Document>, StorageError>;

    /// Delete a document, returning whether it existed
    async fn delete(&self, id: &Uuid) -> Result<bool, StorageError>;

    /// Delete every document, returning how many were removed
    async fn delete_all(&self) -> Result<u64, StorageError>;
}

impl std::fmt::Debug for dyn Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Collection({})", self.name())
    }
}

/// Read the `id` of a document
pub fn document_id(doc: &Document) -> Result<Uuid, StorageError> {
    doc.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| StorageError::Serialization {
            message: "document has no valid 'id' field".to_string(),
        })
}

/// Order documents by the given keys; the sort is stable
pub fn sort_documents(docs: &mut [Document], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for key in keys {
            let ord = compare_json(get_path(a, &key.field), get_path(b, &key.field));
            let ord = match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}
