//! Core module containing fundamental traits and types for the API

pub mod auth;
pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod geo;
pub mod listing;
pub mod query;
pub mod relation;
pub mod service;
pub mod store;
pub mod validation;

pub use auth::{AuthContext, AuthPolicy, JwtAuthProvider, Role};
pub use entity::{Entity, parse_id};
pub use error::{ApiError, ApiResult};
pub use field::{FieldFormat, FieldValue};
pub use filter::{Condition, Filter, GeoWithin, Operator, Predicate};
pub use geo::{GeoLocation, Geocoder, GeocoderEntry, StaticGeocoder, locate};
pub use listing::{AdvancedResults, listing_route};
pub use query::{DataResponse, Pagination, PaginationLinks, Projection, QueryParams, ResultEnvelope, SortKey};
pub use relation::RelationSpec;
pub use service::DataService;
pub use store::{Collection, Document, FindOptions};
