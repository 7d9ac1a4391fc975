//! Typed error handling for the bootcamp API
//!
//! Every failure a handler can produce is one of the category enums below,
//! wrapped in [`ApiError`]. The category decides the HTTP status; the
//! response body is always the same envelope:
//!
//! ```json
//! { "success": false, "error": "Bootcamp not found with id of 5d713995" }
//! ```
//!
//! # Error Categories
//!
//! - [`EntityError`]: missing resources and malformed identifiers
//! - [`ValidationError`]: payload, query string and filter syntax problems
//! - [`StorageError`]: backend failures and uniqueness conflicts
//! - [`RequestError`]: authentication, authorization and upload problems
//! - [`ConfigError`]: configuration parsing and validation
//!
//! Server-side failures (5xx) never leak their detail to the client: the
//! body carries `Server Error` and the detail goes to `tracing::error!`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Message sent to clients for any 5xx response.
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// The main error type returned by handlers and services
#[derive(Debug, Error)]
pub enum ApiError {
    /// Entity-related errors (lookups by id)
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Client input errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// HTTP/Request errors (auth, uploads, routing)
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything else that should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Entity(e) => e.status_code(),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(e) => e.status_code(),
            ApiError::Request(e) => e.status_code(),
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message a client is allowed to see
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            SERVER_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.public_message(),
        }
    }

    pub fn unauthorized() -> Self {
        RequestError::Unauthorized {
            message: "Not authorized to access this route".to_string(),
        }
        .into()
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        RequestError::BadRequest {
            message: message.into(),
        }
        .into()
    }

    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
        .into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} not found with id of {id}")]
    NotFound { entity_type: String, id: String },

    /// The identifier could not be parsed; reported as not found
    #[error("Resource not found with id of {value}")]
    InvalidId { value: String },

    /// Stored document does not match the entity shape
    #[error("Failed to serialize/deserialize {entity_type}: {message}")]
    Serialization { entity_type: String, message: String },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::InvalidId { .. } => StatusCode::NOT_FOUND,
            EntityError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to client input
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more payload fields failed validation
    #[error("{}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Query string key could not be parsed into a filter
    #[error("Malformed filter '{key}': {message}")]
    MalformedFilter { key: String, message: String },

    /// Reserved query parameter has an unusable value
    #[error("Invalid query parameter '{param}': {message}")]
    InvalidQuery { param: String, message: String },

    /// Invalid JSON body or body shape
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique field already holds this value
    #[error("Duplicate field value entered")]
    Duplicate { collection: String, field: String },

    /// Connection error
    #[error("Failed to connect to {backend}: {message}")]
    Connection { backend: String, message: String },

    /// Query execution error
    #[error("{backend} query error: {message}")]
    Query { backend: String, message: String },

    /// Document could not be converted to or from the backend format
    #[error("Document conversion error: {message}")]
    Serialization { message: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Missing or invalid credentials
    #[error("{message}")]
    Unauthorized { message: String },

    /// Authenticated but not allowed
    #[error("{message}")]
    Forbidden { message: String },

    /// Request is well-formed JSON but unusable (uploads, login)
    #[error("{message}")]
    BadRequest { message: String },

    /// Lookup by something other than an id came up empty
    #[error("{message}")]
    NotFound { message: String },

    /// No route matched
    #[error("Route {method} {path} not found")]
    RouteNotFound { method: String, path: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RequestError::NotFound { .. } | RequestError::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", file_suffix(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn file_suffix(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

/// A specialized Result type for handlers and services
pub type ApiResult<T> = Result<T, ApiError>;
