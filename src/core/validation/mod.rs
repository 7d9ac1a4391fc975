//! Validation and filtering system
//!
//! Payloads are filtered (trim, lowercase) and validated per entity and per
//! operation before they reach the handlers.

pub mod config;
pub mod extractor;
pub mod filters;
pub mod validators;

pub use config::EntityValidationConfig;
pub use extractor::{Operation, ValidatableEntity, Validated};
