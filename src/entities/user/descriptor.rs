//! Entity descriptor for User
//!
//! Users are only reachable through the authentication routes.

use super::handlers::{login, me, register};
use crate::server::entity_registry::EntityDescriptor;
use crate::server::host::AppState;
use axum::Router;
use axum::routing::{get, post};

/// Descriptor for the User entity
#[derive(Debug, Default)]
pub struct UserDescriptor;

impl EntityDescriptor for UserDescriptor {
    fn entity_type(&self) -> &str {
        "user"
    }

    fn plural(&self) -> &str {
        "users"
    }

    fn build_routes(&self) -> Router<AppState> {
        Router::new()
            .route("/auth/register", post(register))
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
    }
}
