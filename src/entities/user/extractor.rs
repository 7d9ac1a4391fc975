//! Request extractor for the authenticated user

use super::model::User;
use crate::core::auth::{AuthContext, AuthPolicy, bearer_token};
use crate::core::error::{ApiError, ApiResult};
use crate::server::host::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

/// The user behind the request's bearer token
///
/// Extraction fails with 401 when the token is missing, invalid or expired,
/// or when its user no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn context(&self) -> AuthContext {
        AuthContext::User {
            user_id: self.0.id,
            role: self.0.role,
        }
    }

    /// Enforce a policy for this user (403 on refusal)
    pub fn authorize(&self, policy: &AuthPolicy) -> ApiResult<()> {
        policy.enforce(&self.context())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, host: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let claims = host.auth.verify(token)?;
        let user_id = claims.user_id().ok_or_else(ApiError::unauthorized)?;
        let user = host
            .users
            .get(&user_id)
            .await?
            .ok_or_else(ApiError::unauthorized)?;
        Ok(CurrentUser(user))
    }
}
