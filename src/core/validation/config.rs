//! Per-entity validation configuration

use crate::core::error::FieldValidationError;
use indexmap::IndexMap;
use serde_json::Value;

type ValidatorFn = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;
type FilterFn = Box<dyn Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync>;

/// Validators and filters for the fields of one entity and one operation
///
/// Filters run first, and only on fields present in the payload. Validators
/// then see every configured field, absent ones as `null`, and all failures
/// are collected rather than stopping at the first.
pub struct EntityValidationConfig {
    pub entity_type: String,
    validators: IndexMap<String, Vec<ValidatorFn>>,
    filters: IndexMap<String, Vec<FilterFn>>,
}

impl std::fmt::Debug for EntityValidationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityValidationConfig")
            .field("entity_type", &self.entity_type)
            .field("validated", &self.validators.keys().collect::<Vec<_>>())
            .field("filtered", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EntityValidationConfig {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            validators: IndexMap::new(),
            filters: IndexMap::new(),
        }
    }

    pub fn add_validator<F>(&mut self, field: &str, validator: F) -> &mut Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators
            .entry(field.to_string())
            .or_default()
            .push(Box::new(validator));
        self
    }

    pub fn add_filter<F>(&mut self, field: &str, filter: F) -> &mut Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters
            .entry(field.to_string())
            .or_default()
            .push(Box::new(filter));
        self
    }

    /// Filter then validate a JSON payload
    pub fn validate_and_filter(&self, payload: Value) -> Result<Value, Vec<FieldValidationError>> {
        let Value::Object(mut fields) = payload else {
            return Err(vec![FieldValidationError {
                field: "body".to_string(),
                message: "Request body must be a JSON object".to_string(),
            }]);
        };

        let mut errors = Vec::new();

        for (field, filters) in &self.filters {
            let Some(mut value) = fields.remove(field) else {
                continue;
            };
            for filter in filters {
                match filter(field, value.clone()) {
                    Ok(filtered) => value = filtered,
                    Err(e) => errors.push(FieldValidationError {
                        field: field.clone(),
                        message: e.to_string(),
                    }),
                }
            }
            fields.insert(field.clone(), value);
        }

        for (field, validators) in &self.validators {
            let value = fields.get(field).unwrap_or(&Value::Null);
            for validator in validators {
                if let Err(message) = validator(field, value) {
                    errors.push(FieldValidationError {
                        field: field.clone(),
                        message,
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(fields))
        } else {
            Err(errors)
        }
    }
}
