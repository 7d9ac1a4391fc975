//! Shared test harness for storage backend testing
//!
//! Provides document builders for a small `people` collection and the
//! `collection_contract_tests!` macro that every `Collection` backend must
//! pass.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod collection_contract_tests;

use devcamper::core::store::Document;
use serde_json::{Value, json};
use uuid::Uuid;

/// Name of the collection the contract runs against
pub const PEOPLE: &str = "people";

/// Unique field of the `people` collection
pub const UNIQUE_FIELD: &str = "email";

/// Turn a JSON object into a document with a fresh id
pub fn doc(value: Value) -> Document {
    let Value::Object(mut doc) = value else {
        panic!("test documents must be JSON objects");
    };
    doc.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
    doc
}

/// A person living at `[lng, lat]`
pub fn person(name: &str, age: i64, city: &str, coordinates: [f64; 2]) -> Document {
    doc(json!({
        "name": name,
        "email": format!("{}@test.com", name.to_lowercase()),
        "age": age,
        "tags": ["member"],
        "address": { "city": city },
        "location": { "type": "Point", "coordinates": coordinates },
        "createdAt": devcamper::core::entity::timestamp::now()
    }))
}

/// Boston, Cambridge (about 3 miles away) and New York (about 190 miles away)
pub fn neighbours() -> Vec<Document> {
    vec![
        person("Alice", 30, "Boston", [-71.0589, 42.3601]),
        person("Bob", 25, "Cambridge", [-71.1097, 42.3736]),
        person("Carol", 41, "New York", [-74.006, 40.7128]),
    ]
}

/// Names of a page of documents, in order
pub fn names(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d["name"].as_str().unwrap_or_default().to_string())
        .collect()
}
