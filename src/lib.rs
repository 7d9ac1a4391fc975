//! # devcamper
//!
//! REST backend for a directory of coding bootcamps and their courses.
//!
//! ## Features
//!
//! - **Advanced results**: every listing route accepts filtering
//!   (`averageCost[lte]=10000`), sorting, field selection, pagination and
//!   relation expansion straight from the query string
//! - **Pluggable storage**: in-memory collections, or MongoDB behind the
//!   `mongodb_backend` feature
//! - **JWT auth**: bearer tokens with role-based authorization
//! - **Geo search**: bootcamps within a radius of a zipcode
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use devcamper::prelude::*;
//!
//! let config = AppConfig::load(None)?;
//! ServerBuilder::new(config)
//!     .with_collections(Collections::in_memory())
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AdvancedResults, ApiError, ApiResult, AuthContext, AuthPolicy, Collection, DataResponse,
        DataService, Entity, FieldValue, Filter, GeoLocation, Geocoder, JwtAuthProvider,
        Projection, QueryParams, RelationSpec, ResultEnvelope, Role, StaticGeocoder, listing_route,
    };

    // === Entities ===
    pub use crate::entities::{Bootcamp, Course, CurrentUser, User};

    // === Storage ===
    pub use crate::storage::{Collections, InMemoryCollection};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoCollection;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, EntityDescriptor, EntityRegistry, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{delete, get, post, put},
    };
}
