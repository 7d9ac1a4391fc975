//! Configuration loading and management
//!
//! Every field has a default; a YAML file may override any subset of them,
//! and environment variables override the file:
//!
//! | Variable           | Field                   |
//! |--------------------|-------------------------|
//! | `HOST`             | `server.host`           |
//! | `PORT`             | `server.port`           |
//! | `APP_ENV`          | `environment`           |
//! | `MONGO_URI`        | `database.uri`          |
//! | `MONGO_DB`         | `database.name`         |
//! | `JWT_SECRET`       | `auth.jwt_secret`       |
//! | `JWT_EXPIRE`       | `auth.jwt_expire`       |
//! | `FILE_UPLOAD_PATH` | `uploads.path`          |
//! | `MAX_FILE_UPLOAD`  | `uploads.max_file_size` |

use crate::core::error::ConfigError;
use crate::core::geo::GeocoderEntry;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MongoDB connection string; in-memory collections are used when unset
    pub uri: Option<String>,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            name: "devcamper".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime such as `30d`, `12h`, `15m` or `45s`
    pub jwt_expire: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expire: "30d".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub path: PathBuf,
    /// Maximum photo size in bytes
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./public/uploads"),
            max_file_size: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub entries: Vec<GeocoderEntry>,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub environment: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub geocoder: GeocoderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            environment: "development".to_string(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            uploads: UploadConfig::default(),
            geocoder: GeocoderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::IoError {
                message: e.to_string(),
            },
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Defaults, then the optional file, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from variables resolved by `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_number("PORT", &port)?;
        }
        if let Some(environment) = lookup("APP_ENV") {
            self.environment = environment;
        }
        if let Some(uri) = lookup("MONGO_URI") {
            self.database.uri = Some(uri).filter(|u| !u.is_empty());
        }
        if let Some(name) = lookup("MONGO_DB") {
            self.database.name = name;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(expire) = lookup("JWT_EXPIRE") {
            self.auth.jwt_expire = expire;
        }
        if let Some(path) = lookup("FILE_UPLOAD_PATH") {
            self.uploads.path = PathBuf::from(path);
        }
        if let Some(size) = lookup("MAX_FILE_UPLOAD") {
            self.uploads.max_file_size = parse_number("MAX_FILE_UPLOAD", &size)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.jwt_secret".to_string(),
                value: String::new(),
                message: "a signing secret is required (set JWT_SECRET)".to_string(),
            });
        }
        self.jwt_ttl()?;
        if self.uploads.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "uploads.max_file_size".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Token lifetime parsed from `auth.jwt_expire`
    pub fn jwt_ttl(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.auth.jwt_expire).ok_or_else(|| ConfigError::InvalidValue {
            field: "auth.jwt_expire".to_string(),
            value: self.auth.jwt_expire.clone(),
            message: "expected a number followed by d, h, m or s".to_string(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Parse `30d`, `12h`, `15m`, `45s`; a bare number means seconds
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let amount: i64 = digits.parse().ok()?;
    match unit {
        "d" => Duration::try_days(amount),
        "h" => Duration::try_hours(amount),
        "m" => Duration::try_minutes(amount),
        "s" | "" => Duration::try_seconds(amount),
        _ => None,
    }
    .filter(|d| *d > Duration::zero())
}

fn parse_number<T: std::str::FromStr>(variable: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: variable.to_string(),
        value: raw.to_string(),
        message: "expected a positive integer".to_string(),
    })
}
