//! Reusable field validators
//!
//! Each validator receives the field name and its value (`null` when the
//! field is absent) and only judges values of the type it understands;
//! anything else passes through to the other validators.

use crate::core::field::FieldFormat;
use serde_json::Value;

/// Validator: field is required (present and not null)
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() {
            let article = if field.starts_with(['a', 'e', 'i', 'o', 'u']) {
                "an"
            } else {
                "a"
            };
            Err(format!("Please add {} {}", article, field))
        } else {
            Ok(())
        }
    }
}

/// Validator: field is optional (always valid)
pub fn optional() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |_: &str, _: &Value| Ok(())
}

/// Validator: number must be positive
pub fn positive() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num <= 0.0 => Err(format!("{} must be positive", field)),
        _ => Ok(()),
    }
}

/// Validator: value must be a number
pub fn number() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| {
        if value.is_null() || value.is_number() {
            Ok(())
        } else {
            Err(format!("{} must be a number", field))
        }
    }
}

/// Validator: string length must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!("{} must be at least {} characters", field, min))
        } else if len > max {
            Err(format!("{} can not be more than {} characters", field, max))
        } else {
            Ok(())
        }
    }
}

/// Validator: string must not exceed `max` characters
pub fn max_length(max: usize) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    string_length(0, max)
}

/// Validator: number must lie within `min..=max`
pub fn range(min: f64, max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num < min => Err(format!("{} must be at least {}", field, min)),
        Some(num) if num > max => Err(format!("{} can not be more than {}", field, max)),
        _ => Ok(()),
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_str() {
        Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
            "{} must be one of: {} (got '{}')",
            field,
            allowed.join(", "),
            s
        )),
        _ => Ok(()),
    }
}

/// Validator: every element of an array must be in the allowed list
pub fn each_in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    let check = in_list(allowed);
    move |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Ok(());
        };
        items.iter().try_for_each(|item| {
            if item.is_string() {
                check(field, item)
            } else {
                Err(format!("{} must only contain strings", field))
            }
        })
    }
}

/// Validator: string must match a well-known format
pub fn format(
    expected: FieldFormat,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !expected.validate(s) => Err(format!("Please add a valid {}", expected.describe())),
        _ => Ok(()),
    }
}
