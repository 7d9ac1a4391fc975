//! User entity

use crate::core::auth::{Role, hash_password};
use crate::core::entity::{Entity, timestamp};
use crate::core::error::ApiResult;
use crate::core::field::FieldFormat;
use crate::core::validation::{EntityValidationConfig, Operation, ValidatableEntity, filters, validators};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Stored user, including the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// argon2 PHC string
    pub password: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// What clients get to see of a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Registration payload, after validation
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub password: String,
}

/// Login payload; both fields are checked by the handler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl User {
    /// Create a user, hashing the plain password
    pub async fn register(registration: Registration) -> ApiResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: registration.name,
            email: registration.email,
            role: registration.role,
            password: hash_password(registration.password).await?,
            created_at: Utc::now(),
        })
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

impl Entity for User {
    fn resource_name() -> &'static str {
        "users"
    }

    fn resource_name_singular() -> &'static str {
        "user"
    }

    fn display_name() -> &'static str {
        "User"
    }

    fn unique_fields() -> &'static [&'static str] {
        &["email"]
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ValidatableEntity for User {
    fn validation_config(operation: Operation) -> EntityValidationConfig {
        let mut config = EntityValidationConfig::new("user");
        if operation == Operation::Create {
            for field in ["name", "email", "password"] {
                config.add_validator(field, validators::required());
            }
        }
        config
            .add_filter("email", filters::trim())
            .add_filter("email", filters::lowercase())
            .add_validator("email", validators::format(FieldFormat::Email))
            // Admins are never self-registered.
            .add_validator(
                "role",
                validators::in_list(vec![
                    Role::User.as_str().to_string(),
                    Role::Publisher.as_str().to_string(),
                ]),
            )
            .add_validator(
                "password",
                validators::string_length(MIN_PASSWORD_LENGTH, usize::MAX),
            );
        config
    }
}
