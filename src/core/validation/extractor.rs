//! Axum extractor for validated payloads
//!
//! `Validated<T>` parses the JSON body, runs `T`'s filters and validators
//! for the operation implied by the HTTP method, and rejects with a 400
//! before the handler runs.

use super::config::EntityValidationConfig;
use crate::core::error::{ApiError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
    http::Method,
};
use serde_json::Value;

/// Write operation a payload is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    fn from_method(method: &Method) -> Self {
        match *method {
            Method::PUT | Method::PATCH => Operation::Update,
            _ => Operation::Create,
        }
    }
}

/// Trait for entities that support validation
pub trait ValidatableEntity {
    /// Get the validation configuration for a specific operation
    fn validation_config(operation: Operation) -> EntityValidationConfig;
}

/// Axum extractor that validates and filters entity data
///
/// ```rust,ignore
/// pub async fn create_course(
///     Validated(payload, _): Validated<Course>,
/// ) -> ApiResult<Json<DataResponse<Course>>> {
///     // payload is already trimmed and validated
/// }
/// ```
pub struct Validated<T>(pub Value, pub std::marker::PhantomData<T>);

impl<T> Validated<T> {
    pub fn new(payload: Value) -> Self {
        Self(payload, std::marker::PhantomData)
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: ValidatableEntity + Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let operation = Operation::from_method(req.method());

        let Json(payload): Json<Value> = Json::from_request(req, state).await.map_err(|e| {
            ValidationError::InvalidJson {
                message: e.body_text(),
            }
        })?;

        T::validation_config(operation)
            .validate_and_filter(payload)
            .map(Validated::new)
            .map_err(|errors| ValidationError::FieldErrors(errors).into())
    }
}
