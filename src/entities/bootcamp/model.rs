//! Bootcamp entity

use crate::core::entity::{Entity, decode_document, merge_writable, timestamp};
use crate::core::error::ApiResult;
use crate::core::field::FieldFormat;
use crate::core::geo::GeoLocation;
use crate::core::service::DataService;
use crate::core::validation::{EntityValidationConfig, Operation, ValidatableEntity, filters, validators};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

/// Fields a client may set on create and update
pub const WRITABLE_FIELDS: &[&str] = &[
    "name",
    "description",
    "website",
    "phone",
    "email",
    "address",
    "careers",
    "averageRating",
    "housing",
    "jobAssistance",
    "jobGuarantee",
    "acceptGi",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

impl Career {
    pub const ALL: [Career; 6] = [
        Career::WebDevelopment,
        Career::MobileDevelopment,
        Career::UiUx,
        Career::DataScience,
        Career::Business,
        Career::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub careers: Vec<Career>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    /// Publisher who created the bootcamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Uuid>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

impl Bootcamp {
    /// Build a new bootcamp from a validated create payload
    pub fn from_payload(payload: Value, owner: Option<Uuid>) -> ApiResult<Self> {
        let mut doc = Map::new();
        merge_writable(&mut doc, payload, WRITABLE_FIELDS);
        let slug = doc
            .get("name")
            .and_then(Value::as_str)
            .map(slugify)
            .unwrap_or_default();
        doc.insert("id".into(), json!(Uuid::new_v4()));
        doc.insert("slug".into(), Value::String(slug));
        doc.insert("createdAt".into(), Value::String(timestamp::now()));
        if let Some(owner) = owner {
            doc.insert("user".into(), json!(owner));
        }
        Ok(decode_document(doc)?)
    }

    /// Apply a validated update payload; the slug follows the name
    pub fn with_changes(&self, payload: Value) -> ApiResult<Self> {
        let mut doc = DataService::<Self>::to_document(self)?;
        merge_writable(&mut doc, payload, WRITABLE_FIELDS);
        let mut updated: Self = decode_document(doc)?;
        updated.slug = slugify(&updated.name);
        Ok(updated)
    }
}

impl Entity for Bootcamp {
    fn resource_name() -> &'static str {
        "bootcamps"
    }

    fn resource_name_singular() -> &'static str {
        "bootcamp"
    }

    fn display_name() -> &'static str {
        "Bootcamp"
    }

    fn unique_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ValidatableEntity for Bootcamp {
    fn validation_config(operation: Operation) -> EntityValidationConfig {
        let mut config = EntityValidationConfig::new("bootcamp");
        if operation == Operation::Create {
            config
                .add_validator("name", validators::required())
                .add_validator("description", validators::required())
                .add_validator("address", validators::required())
                .add_validator("careers", validators::required());
        }
        config
            .add_filter("name", filters::trim())
            .add_validator("name", validators::max_length(50))
            .add_validator("description", validators::max_length(500))
            .add_validator("website", validators::format(FieldFormat::Url))
            .add_validator("phone", validators::max_length(20))
            .add_filter("email", filters::trim())
            .add_validator("email", validators::format(FieldFormat::Email))
            .add_validator(
                "careers",
                validators::each_in_list(Career::ALL.iter().map(|c| c.as_str().to_string()).collect()),
            )
            .add_validator("averageRating", validators::range(1.0, 10.0));
        config
    }
}

/// URL-friendly form of a name: lowercase words joined by `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for word in name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.extend(word.chars().flat_map(char::to_lowercase));
    }
    slug
}
