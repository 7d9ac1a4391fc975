//! Entity registry for managing entity descriptors and their routes

use crate::server::host::AppState;
use axum::Router;
use indexmap::IndexMap;

/// Trait that describes how to build routes for an entity
///
/// Each resource (bootcamps, courses, users) implements this trait to
/// provide its routes. Routes are relative to the API prefix and still
/// expect the host as state.
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "bootcamp")
    fn entity_type(&self) -> &str;

    /// The plural form (e.g., "bootcamps")
    fn plural(&self) -> &str;

    /// Build the routes for this entity
    fn build_routes(&self) -> Router<AppState>;
}

/// Registry for all entities in the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
        }
    }

    /// Register an entity descriptor
    ///
    /// The entity type name is the key; registering it again replaces it.
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Build a router with all registered entity routes
    pub fn build_routes(&self) -> Router<AppState> {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                tracing::debug!(resource = descriptor.plural(), "mounting routes");
                router.merge(descriptor.build_routes())
            })
    }

    /// Get all registered entity types, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal mock EntityDescriptor for testing
    struct MockDescriptor {
        entity_type: String,
        plural: String,
    }

    impl MockDescriptor {
        fn new(entity_type: &str, plural: &str) -> Self {
            Self {
                entity_type: entity_type.to_string(),
                plural: plural.to_string(),
            }
        }
    }

    impl EntityDescriptor for MockDescriptor {
        fn entity_type(&self) -> &str {
            &self.entity_type
        }

        fn plural(&self) -> &str {
            &self.plural
        }

        fn build_routes(&self) -> Router<AppState> {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        assert!(EntityRegistry::new().entity_types().is_empty());
        assert!(EntityRegistry::default().entity_types().is_empty());
    }

    #[test]
    fn test_register_keeps_order() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("bootcamp", "bootcamps")));
        registry.register(Box::new(MockDescriptor::new("course", "courses")));
        registry.register(Box::new(MockDescriptor::new("user", "users")));
        assert_eq!(registry.entity_types(), ["bootcamp", "course", "user"]);
    }

    #[test]
    fn test_register_duplicate_replaces() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("course", "courses")));
        registry.register(Box::new(MockDescriptor::new("course", "classes")));
        assert_eq!(registry.entity_types().len(), 1);
    }

    #[test]
    fn test_build_routes_with_entities() {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(MockDescriptor::new("bootcamp", "bootcamps")));
        let _router = registry.build_routes();
    }
}
