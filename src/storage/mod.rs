//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;
pub mod seed;

pub use in_memory::InMemoryCollection;
#[cfg(feature = "mongodb_backend")]
pub use self::mongodb::MongoCollection;

use crate::core::entity::Entity;
use crate::core::store::Collection;
use crate::entities::{Bootcamp, Course, User};
use std::sync::Arc;

/// The three collections the API is built on
#[derive(Clone, Debug)]
pub struct Collections {
    pub bootcamps: Arc<dyn Collection>,
    pub courses: Arc<dyn Collection>,
    pub users: Arc<dyn Collection>,
}

impl Collections {
    /// Process-local collections; contents are lost on exit
    pub fn in_memory() -> Self {
        fn collection<T: Entity>() -> Arc<dyn Collection> {
            Arc::new(
                InMemoryCollection::new(T::resource_name())
                    .with_unique_fields(T::unique_fields().iter().copied()),
            )
        }

        Self {
            bootcamps: collection::<Bootcamp>(),
            courses: collection::<Course>(),
            users: collection::<User>(),
        }
    }

    /// Connect to MongoDB and make sure unique indexes exist
    #[cfg(feature = "mongodb_backend")]
    pub async fn mongodb(uri: &str, database: &str) -> Result<Self, crate::core::error::StorageError> {
        use crate::core::error::StorageError;

        let client = ::mongodb::Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::Connection {
                backend: "mongodb".to_string(),
                message: e.to_string(),
            })?;
        let db = client.database(database);

        async fn collection<T: Entity>(
            db: &::mongodb::Database,
        ) -> Result<Arc<dyn Collection>, StorageError> {
            let collection = MongoCollection::new(db, T::resource_name())
                .with_unique_fields(T::unique_fields().iter().copied());
            collection.ensure_indexes().await?;
            Ok(Arc::new(collection))
        }

        tracing::info!(database, "connected to MongoDB");
        Ok(Self {
            bootcamps: collection::<Bootcamp>(&db).await?,
            courses: collection::<Course>(&db).await?,
            users: collection::<User>(&db).await?,
        })
    }
}
