//! Entity descriptor for Course

use super::handlers::{
    bootcamp_courses, create_course, delete_course, get_course, update_course,
};
use crate::core::listing::{AdvancedResults, listing_route};
use crate::core::query::Projection;
use crate::core::relation::RelationSpec;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::host::AppState;
use crate::storage::Collections;
use axum::Router;
use axum::routing::get;

/// Descriptor for the Course entity
pub struct CourseDescriptor {
    listing: AdvancedResults,
}

impl CourseDescriptor {
    /// Listings replace each course's bootcamp id with the bootcamp's
    /// name and description
    pub fn new(collections: &Collections) -> Self {
        let listing = AdvancedResults::new(collections.courses.clone()).populate(
            RelationSpec::reference("bootcamp", collections.bootcamps.clone())
                .select(Projection::include(["name", "description"])),
        );
        Self { listing }
    }
}

impl EntityDescriptor for CourseDescriptor {
    fn entity_type(&self) -> &str {
        "course"
    }

    fn plural(&self) -> &str {
        "courses"
    }

    fn build_routes(&self) -> Router<AppState> {
        // Nested under bootcamps; the parameter keeps the `{id}` name so it
        // shares the bootcamp routes' path tree.
        Router::new()
            .route("/courses", listing_route(self.listing.clone()))
            .route(
                "/courses/{id}",
                get(get_course).put(update_course).delete(delete_course),
            )
            .route(
                "/bootcamps/{id}/courses",
                get(bootcamp_courses).post(create_course),
            )
    }
}
