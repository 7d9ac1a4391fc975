//! Entity descriptor for Bootcamp

use super::handlers::{
    bootcamps_in_radius, create_bootcamp, delete_bootcamp, get_bootcamp, update_bootcamp,
    upload_photo,
};
use crate::core::listing::{AdvancedResults, listing_route};
use crate::core::relation::RelationSpec;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::host::AppState;
use crate::storage::Collections;
use axum::Router;
use axum::routing::{get, put};

/// Descriptor for the Bootcamp entity
pub struct BootcampDescriptor {
    listing: AdvancedResults,
}

impl BootcampDescriptor {
    /// Listings expand each bootcamp's courses
    pub fn new(collections: &Collections) -> Self {
        let listing = AdvancedResults::new(collections.bootcamps.clone()).populate(
            RelationSpec::reverse("courses", collections.courses.clone(), "bootcamp"),
        );
        Self { listing }
    }
}

impl EntityDescriptor for BootcampDescriptor {
    fn entity_type(&self) -> &str {
        "bootcamp"
    }

    fn plural(&self) -> &str {
        "bootcamps"
    }

    fn build_routes(&self) -> Router<AppState> {
        Router::new()
            .route(
                "/bootcamps",
                listing_route(self.listing.clone()).post(create_bootcamp),
            )
            .route(
                "/bootcamps/radius/{zipcode}/{distance}",
                get(bootcamps_in_radius),
            )
            .route(
                "/bootcamps/{id}",
                get(get_bootcamp).put(update_bootcamp).delete(delete_bootcamp),
            )
            .route("/bootcamps/{id}/photo", put(upload_photo))
    }
}
