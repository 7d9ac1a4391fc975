//! REST API exposure
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`.
//! Resource routes live under `/api/v1`; uploaded photos are served from
//! `/uploads`; anything else answers with the JSON error envelope.

use crate::core::error::{ApiError, RequestError};
use crate::server::host::AppState;
use axum::extract::{DefaultBodyLimit, OriginalUri};
use axum::http::Method;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Prefix of every resource route
pub const API_PREFIX: &str = "/api/v1";

/// Headroom on top of the photo size limit for the rest of a multipart body
const BODY_LIMIT_MARGIN: usize = 1024 * 1024;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// `custom_routes` are mounted next to the resource routes, under the
    /// API prefix.
    pub fn build_router(host: AppState, custom_routes: Vec<Router<AppState>>) -> Router {
        let api = custom_routes
            .into_iter()
            .fold(host.entity_registry.build_routes(), Router::merge);

        let body_limit =
            usize::try_from(host.config.uploads.max_file_size).unwrap_or(usize::MAX) + BODY_LIMIT_MARGIN;
        let uploads = ServeDir::new(&host.config.uploads.path);

        Self::health_routes()
            .nest(API_PREFIX, api)
            .nest_service("/uploads", uploads)
            .fallback(route_not_found)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(host)
    }

    /// Build health check routes
    fn health_routes() -> Router<AppState> {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "devcamper-api"
        }))
    }
}

async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    RequestError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
    .into()
}
