//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::exposure::RestExposure;
use super::host::{AppState, ServerHost};
use crate::config::AppConfig;
use crate::core::geo::{Geocoder, StaticGeocoder};
use crate::entities::{BootcampDescriptor, CourseDescriptor, UserDescriptor};
use crate::storage::Collections;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the API server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(AppConfig::load(None)?)
///     .with_collections(Collections::in_memory())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    collections: Option<Collections>,
    geocoder: Option<Arc<dyn Geocoder>>,
    custom_routes: Vec<Router<AppState>>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            collections: None,
            geocoder: None,
            custom_routes: Vec::new(),
        }
    }

    /// Storage to serve from; in-memory collections when never called
    pub fn with_collections(mut self, collections: Collections) -> Self {
        self.collections = Some(collections);
        self
    }

    /// Geocoder for addresses and radius searches
    ///
    /// Defaults to a [`StaticGeocoder`] over the `geocoder.entries` config
    /// section.
    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Arc::new(geocoder));
        self
    }

    /// Add routes next to the resource routes, under the API prefix
    pub fn with_custom_routes(mut self, routes: Router<AppState>) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        let collections = self.collections.unwrap_or_else(Collections::in_memory);
        let geocoder = self.geocoder.unwrap_or_else(|| {
            Arc::new(StaticGeocoder::new(self.config.geocoder.entries.clone()))
        });

        let mut entity_registry = EntityRegistry::new();
        entity_registry.register(Box::new(BootcampDescriptor::new(&collections)));
        entity_registry.register(Box::new(CourseDescriptor::new(&collections)));
        entity_registry.register(Box::new(UserDescriptor));

        ServerHost::from_builder_components(self.config, collections, geocoder, entity_registry)
    }

    /// Build the host and its REST router
    ///
    /// The host stays usable for out-of-band work such as seeding.
    pub fn build_with_host(mut self) -> Result<(AppState, Router)> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let router = RestExposure::build_router(host.clone(), custom_routes);
        Ok((host, router))
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        Ok(self.build_with_host()?.1)
    }

    /// Serve on the configured address until SIGTERM or Ctrl+C
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_address();
        let app = self.build()?;
        serve_router(app, &addr).await
    }
}

/// Serve a router with graceful shutdown
pub async fn serve_router(app: Router, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::GeocoderEntry;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "builder-secret".into();
        config
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new(config());
        assert!(builder.collections.is_none());
        assert!(builder.geocoder.is_none());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new(config())
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_build_host_registers_resources() {
        let host = ServerBuilder::new(config())
            .build_host()
            .expect("build_host should succeed");
        assert_eq!(host.entity_types(), ["bootcamp", "course", "user"]);
        assert_eq!(host.collections.bootcamps.name(), "bootcamps");
    }

    #[tokio::test]
    async fn test_default_geocoder_reads_config() {
        let mut config = config();
        config.geocoder.entries.push(GeocoderEntry {
            zipcode: "02118".into(),
            latitude: 42.3,
            longitude: -71.1,
            street: None,
            city: Some("Boston".into()),
            state: None,
            country: None,
        });
        let host = ServerBuilder::new(config).build_host().unwrap();
        let found = host.geocoder.geocode("02118").await.unwrap();
        assert_eq!(found.and_then(|l| l.city), Some("Boston".to_string()));
    }

    #[test]
    fn test_build_without_secret_fails() {
        let result = ServerBuilder::new(AppConfig::default()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_with_custom_routes() {
        use axum::routing::get;

        let custom = Router::new().route("/custom", get(|| async { "ok" }));
        let result = ServerBuilder::new(config())
            .with_collections(Collections::in_memory())
            .with_geocoder(StaticGeocoder::default())
            .with_custom_routes(custom)
            .build();
        assert!(result.is_ok(), "build should succeed with custom routes");
    }
}
