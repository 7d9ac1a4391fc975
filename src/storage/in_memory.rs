//! In-memory implementation of `Collection` for testing and development

use crate::core::error::StorageError;
use crate::core::field::get_path;
use crate::core::filter::Filter;
use crate::core::store::{Collection, Document, FindOptions, document_id, sort_documents};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory document collection
///
/// Documents keep insertion order. Unique fields are checked on insert and
/// replace, mirroring a unique index.
#[derive(Clone)]
pub struct InMemoryCollection {
    name: String,
    unique_fields: Vec<String>,
    documents: Arc<RwLock<IndexMap<Uuid, Document>>>,
}

impl InMemoryCollection {
    /// Create a new empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique_fields: Vec::new(),
            documents: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Enforce uniqueness on the given fields
    pub fn with_unique_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    fn check_unique(
        &self,
        documents: &IndexMap<Uuid, Document>,
        id: &Uuid,
        candidate: &Document,
    ) -> Result<(), StorageError> {
        for field in &self.unique_fields {
            let Some(value) = get_path(candidate, field).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = documents
                .iter()
                .any(|(other_id, other)| other_id != id && get_path(other, field) == Some(value));
            if clash {
                return Err(StorageError::Duplicate {
                    collection: self.name.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StorageError> {
        let documents = self.documents.read().await;
        Ok(documents.values().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn find(&self, options: &FindOptions) -> Result<Vec<Document>, StorageError> {
        let mut matched: Vec<Document> = {
            let documents = self.documents.read().await;
            documents
                .values()
                .filter(|d| options.filter.matches(d))
                .cloned()
                .collect()
        };

        sort_documents(&mut matched, &options.sort);

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match &options.projection {
                Some(projection) => projection.apply(doc),
                None => doc,
            })
            .collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Document>, StorageError> {
        let documents = self.documents.read().await;
        Ok(documents.get(id).cloned())
    }

    async fn insert(&self, document: Document) -> Result<Document, StorageError> {
        let id = document_id(&document)?;
        let mut documents = self.documents.write().await;

        if documents.contains_key(&id) {
            return Err(StorageError::Duplicate {
                collection: self.name.clone(),
                field: "id".to_string(),
            });
        }
        self.check_unique(&documents, &id, &document)?;

        documents.insert(id, document.clone());
        Ok(document)
    }

    async fn replace(&self, id: &Uuid, document: Document) -> Result<Option<Document>, StorageError> {
        let mut documents = self.documents.write().await;

        if !documents.contains_key(id) {
            return Ok(None);
        }
        self.check_unique(&documents, id, &document)?;

        documents.insert(*id, document.clone());
        Ok(Some(document))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StorageError> {
        let mut documents = self.documents.write().await;
        Ok(documents.shift_remove(id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let mut documents = self.documents.write().await;
        let removed = documents.len() as u64;
        documents.clear();
        Ok(removed)
    }
}
