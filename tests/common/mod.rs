//! Shared setup for the HTTP end-to-end tests
//!
//! Builds the full router over in-memory collections with a known geocoder
//! table and a throwaway upload directory.

#![allow(dead_code)]

use axum_test::TestServer;
use devcamper::config::AppConfig;
use devcamper::core::geo::GeocoderEntry;
use devcamper::server::{AppState, ServerBuilder};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const API: &str = "/api/v1";

pub struct TestApp {
    pub server: TestServer,
    pub host: AppState,
    pub uploads: TempDir,
}

fn place(zipcode: &str, latitude: f64, longitude: f64, city: &str, state: &str) -> GeocoderEntry {
    GeocoderEntry {
        zipcode: zipcode.to_string(),
        latitude,
        longitude,
        street: None,
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        country: Some("US".to_string()),
    }
}

pub fn test_config(uploads: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "e2e-secret".to_string();
    config.uploads.path = uploads.path().to_path_buf();
    config.uploads.max_file_size = 1024;
    config.geocoder.entries = vec![
        place("02215", 42.350846, -71.10228, "Boston", "MA"),
        place("02139", 42.3647, -71.1042, "Cambridge", "MA"),
        place("10001", 40.7506, -73.9972, "New York", "NY"),
    ];
    config
}

pub fn spawn_app() -> TestApp {
    let uploads = TempDir::new().expect("Failed to create upload dir");
    let (host, router) = ServerBuilder::new(test_config(&uploads))
        .build_with_host()
        .expect("Failed to build app");
    let server = TestServer::new(router);
    TestApp {
        server,
        host,
        uploads,
    }
}

pub fn url(path: &str) -> String {
    format!("{}{}", API, path)
}

/// A valid create payload located at `zipcode`
pub fn bootcamp_payload(name: &str, zipcode: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} teaches full stack web development", name),
        "website": "https://example.com",
        "phone": "(111) 111-1111",
        "email": "enroll@example.com",
        "address": format!("1 Main St {}", zipcode),
        "careers": ["Web Development", "UI/UX"],
        "housing": true,
        "jobAssistance": true
    })
}

pub fn course_payload(title: &str, tuition: f64) -> Value {
    json!({
        "title": title,
        "description": "Learn by building",
        "weeks": "8",
        "tuition": tuition,
        "minimumSkill": "beginner",
        "scholarshipAvailable": false
    })
}

impl TestApp {
    /// Register a user and return its token
    pub async fn register(&self, name: &str, role: &str) -> String {
        let response = self
            .server
            .post(&url("/auth/register"))
            .json(&json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "password": "123456",
                "role": role
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn publisher(&self) -> String {
        self.register("Publisher", "publisher").await
    }

    /// Create a bootcamp and return its `data`
    pub async fn create_bootcamp(&self, token: &str, payload: Value) -> Value {
        let response = self
            .server
            .post(&url("/bootcamps"))
            .authorization_bearer(token)
            .json(&payload)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    /// Create a course under `bootcamp_id` and return its `data`
    pub async fn create_course(&self, token: &str, bootcamp_id: &str, payload: Value) -> Value {
        let response = self
            .server
            .post(&url(&format!("/bootcamps/{}/courses", bootcamp_id)))
            .authorization_bearer(token)
            .json(&payload)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}
