//! Typed data service over a document collection

use crate::core::entity::Entity;
use crate::core::error::{ApiError, ApiResult, EntityError};
use crate::core::filter::Filter;
use crate::core::query::SortKey;
use crate::core::store::{Collection, Document, FindOptions};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// CRUD operations for one entity type
///
/// Entities go in and out of the collection through serde, so the service
/// is agnostic to the underlying storage mechanism.
pub struct DataService<T> {
    collection: Arc<dyn Collection>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for DataService<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> DataService<T> {
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self {
            collection,
            _marker: PhantomData,
        }
    }

    /// The untyped collection, for listings and relation expansion
    pub fn collection(&self) -> &Arc<dyn Collection> {
        &self.collection
    }

    pub fn to_document(entity: &T) -> ApiResult<Document> {
        match serde_json::to_value(entity) {
            Ok(serde_json::Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(Self::shape_error("entity did not serialize to an object")),
            Err(e) => Err(Self::shape_error(&e.to_string())),
        }
    }

    pub fn from_document(doc: Document) -> ApiResult<T> {
        serde_json::from_value(serde_json::Value::Object(doc))
            .map_err(|e| Self::shape_error(&e.to_string()))
    }

    fn shape_error(message: &str) -> ApiError {
        EntityError::Serialization {
            entity_type: T::resource_name_singular().to_string(),
            message: message.to_string(),
        }
        .into()
    }

    /// Create a new entity
    pub async fn create(&self, entity: &T) -> ApiResult<T> {
        let stored = self.collection.insert(Self::to_document(entity)?).await?;
        Self::from_document(stored)
    }

    /// Get an entity by ID
    pub async fn get(&self, id: &Uuid) -> ApiResult<Option<T>> {
        self.collection
            .find_by_id(id)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    /// Get an entity by ID or fail with a not-found error
    pub async fn get_or_not_found(&self, id: &Uuid) -> ApiResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| ApiError::not_found(T::display_name(), id))
    }

    /// All entities matching `filter`, newest first
    pub async fn find(&self, filter: Filter) -> ApiResult<Vec<T>> {
        let options = FindOptions::new(filter).sort(vec![SortKey::desc("createdAt")]);
        self.collection
            .find(&options)
            .await?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }

    pub async fn find_one(&self, filter: Filter) -> ApiResult<Option<T>> {
        let options = FindOptions::new(filter).limit(1);
        self.collection
            .find(&options)
            .await?
            .into_iter()
            .next()
            .map(Self::from_document)
            .transpose()
    }

    /// Replace an existing entity
    pub async fn update(&self, entity: &T) -> ApiResult<T> {
        let id = entity.id();
        let stored = self
            .collection
            .replace(&id, Self::to_document(entity)?)
            .await?
            .ok_or_else(|| ApiError::not_found(T::display_name(), id))?;
        Self::from_document(stored)
    }

    /// Delete an entity, returning whether it existed
    pub async fn delete(&self, id: &Uuid) -> ApiResult<bool> {
        Ok(self.collection.delete(id).await?)
    }

    pub async fn delete_all(&self) -> ApiResult<u64> {
        Ok(self.collection.delete_all().await?)
    }
}
