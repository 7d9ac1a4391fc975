//! Authentication HTTP handlers

use super::extractor::CurrentUser;
use super::model::{Credentials, Registration, User, UserProfile};
use crate::core::auth::verify_password;
use crate::core::entity::decode_document;
use crate::core::error::{ApiError, ApiResult, RequestError, ValidationError};
use crate::core::field::FieldValue;
use crate::core::filter::Filter;
use crate::core::query::DataResponse;
use crate::core::validation::Validated;
use crate::server::host::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

fn token_response(host: &AppState, user: &User) -> ApiResult<Json<TokenResponse>> {
    Ok(Json(TokenResponse {
        success: true,
        token: host.auth.issue(user.id)?,
    }))
}

/// `POST /auth/register`
pub async fn register(
    State(host): State<AppState>,
    Validated(payload, _): Validated<User>,
) -> ApiResult<Json<TokenResponse>> {
    let Value::Object(fields) = payload else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };
    let registration: Registration = decode_document(fields)?;
    let user = host.users.create(&User::register(registration).await?).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    token_response(&host, &user)
}

/// `POST /auth/login`
pub async fn login(
    State(host): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(credentials) = payload.map_err(|e| ValidationError::InvalidJson {
        message: e.body_text(),
    })?;
    let (Some(email), Some(password)) = (
        credentials.email.filter(|e| !e.trim().is_empty()),
        credentials.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Please provide an email and password"));
    };

    let email = email.trim().to_lowercase();
    let user = host
        .users
        .find_one(Filter::eq("email", FieldValue::String(email)))
        .await?;
    let stored = user.as_ref().map(|user| user.password.clone());
    if !verify_password(password, stored).await? {
        return Err(invalid_credentials());
    }
    let user = user.ok_or_else(invalid_credentials)?;

    token_response(&host, &user)
}

fn invalid_credentials() -> ApiError {
    RequestError::Unauthorized {
        message: "Invalid credentials".to_string(),
    }
    .into()
}

/// `GET /auth/me`
pub async fn me(user: CurrentUser) -> Json<DataResponse<UserProfile>> {
    Json(DataResponse::new(user.0.profile()))
}
