//! Course entity

use crate::core::entity::{Entity, decode_document, merge_writable, timestamp};
use crate::core::error::ApiResult;
use crate::core::service::DataService;
use crate::core::validation::{EntityValidationConfig, Operation, ValidatableEntity, filters, validators};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Fields a client may set on create and update
pub const WRITABLE_FIELDS: &[&str] = &[
    "title",
    "description",
    "weeks",
    "tuition",
    "minimumSkill",
    "scholarshipAvailable",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarship_available: Option<bool>,
    pub bootcamp: Uuid,
    pub user: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Build a new course of `bootcamp` from a validated create payload
    pub fn from_payload(payload: Value, bootcamp: Uuid, owner: Uuid) -> ApiResult<Self> {
        let mut doc = Map::new();
        merge_writable(&mut doc, payload, WRITABLE_FIELDS);
        doc.insert("id".into(), json!(Uuid::new_v4()));
        doc.insert("bootcamp".into(), json!(bootcamp));
        doc.insert("user".into(), json!(owner));
        doc.insert("createdAt".into(), Value::String(timestamp::now()));
        Ok(decode_document(doc)?)
    }

    pub fn with_changes(&self, payload: Value) -> ApiResult<Self> {
        let mut doc = DataService::<Self>::to_document(self)?;
        merge_writable(&mut doc, payload, WRITABLE_FIELDS);
        Ok(decode_document(doc)?)
    }

    /// Mean tuition rounded up to the next multiple of ten
    pub fn average_cost(courses: &[Course]) -> Option<f64> {
        if courses.is_empty() {
            return None;
        }
        let total: f64 = courses.iter().map(|c| c.tuition).sum();
        let average = total / courses.len() as f64;
        Some((average / 10.0).ceil() * 10.0)
    }
}

impl Entity for Course {
    fn resource_name() -> &'static str {
        "courses"
    }

    fn resource_name_singular() -> &'static str {
        "course"
    }

    fn display_name() -> &'static str {
        "Course"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ValidatableEntity for Course {
    fn validation_config(operation: Operation) -> EntityValidationConfig {
        let mut config = EntityValidationConfig::new("course");
        if operation == Operation::Create {
            for field in ["title", "description", "weeks", "tuition", "minimumSkill"] {
                config.add_validator(field, validators::required());
            }
        }
        config
            .add_filter("title", filters::trim())
            .add_filter("weeks", filters::stringify())
            .add_validator("tuition", validators::number())
            .add_validator(
                "minimumSkill",
                validators::in_list(vec![
                    "beginner".to_string(),
                    "intermediate".to_string(),
                    "advanced".to_string(),
                ]),
            );
        config
    }
}
