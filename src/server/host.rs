//! Server host: the application state shared by every handler
//!
//! The host is built once at startup and handed to axum as router state
//! (`State<AppState>`). It is the single source of truth for configuration,
//! storage handles and the token provider.

use crate::config::AppConfig;
use crate::core::auth::JwtAuthProvider;
use crate::core::geo::Geocoder;
use crate::core::service::DataService;
use crate::entities::{Bootcamp, Course, User};
use crate::server::entity_registry::EntityRegistry;
use crate::storage::Collections;
use anyhow::Result;
use std::sync::Arc;

/// Router state
pub type AppState = Arc<ServerHost>;

/// Host context containing all application state
pub struct ServerHost {
    pub config: Arc<AppConfig>,

    pub bootcamps: DataService<Bootcamp>,
    pub courses: DataService<Course>,
    pub users: DataService<User>,

    /// Raw collections, for listings and relation expansion
    pub collections: Collections,

    pub auth: JwtAuthProvider,
    pub geocoder: Arc<dyn Geocoder>,

    /// Entity registry for resource routes
    pub entity_registry: EntityRegistry,
}

impl ServerHost {
    /// Build the host from builder components
    pub fn from_builder_components(
        config: AppConfig,
        collections: Collections,
        geocoder: Arc<dyn Geocoder>,
        entity_registry: EntityRegistry,
    ) -> Result<Self> {
        config.validate()?;
        let auth = JwtAuthProvider::new(&config.auth.jwt_secret, config.jwt_ttl()?);

        Ok(Self {
            bootcamps: DataService::new(collections.bootcamps.clone()),
            courses: DataService::new(collections.courses.clone()),
            users: DataService::new(collections.users.clone()),
            collections,
            auth,
            geocoder,
            entity_registry,
            config: Arc::new(config),
        })
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::StaticGeocoder;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "test-secret".into();
        config
    }

    fn make_host(config: AppConfig) -> Result<ServerHost> {
        ServerHost::from_builder_components(
            config,
            Collections::in_memory(),
            Arc::new(StaticGeocoder::default()),
            EntityRegistry::new(),
        )
    }

    #[test]
    fn test_host_uses_configured_ttl() {
        let mut config = config();
        config.auth.jwt_expire = "12h".into();
        let host = make_host(config).unwrap();
        assert_eq!(host.auth.ttl(), chrono::Duration::hours(12));
        assert!(host.entity_types().is_empty());
    }

    #[test]
    fn test_host_rejects_missing_secret() {
        assert!(make_host(AppConfig::default()).is_err());
    }

    #[test]
    fn test_services_share_collections() {
        let host = make_host(config()).unwrap();
        assert_eq!(host.bootcamps.collection().name(), "bootcamps");
        assert_eq!(host.collections.users.name(), "users");
    }
}
