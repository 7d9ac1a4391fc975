//! End-to-end tests of the REST API
//!
//! These tests drive the complete router (auth, bootcamps, courses, radius
//! search and photo uploads) over in-memory storage.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use common::*;
use serde_json::{Value, json};

// =============================================================================
// Health Check Tests
// =============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = spawn_app();
        for path in ["/health", "/healthz"] {
            let response = app.server.get(path).await;
            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["status"], "ok");
        }
    }
}

// =============================================================================
// Auth Tests
// =============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = spawn_app();
        let token = app.register("Jane", "publisher").await;
        assert!(!token.is_empty());

        let response = app
            .server
            .post(&url("/auth/login"))
            .json(&json!({"email": "JANE@example.com", "password": "123456"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        let login_token = body["token"].as_str().unwrap().to_string();

        let response = app
            .server
            .get(&url("/auth/me"))
            .authorization_bearer(&login_token)
            .await;
        response.assert_status_ok();
        let me: Value = response.json();
        assert_eq!(me["data"]["name"], "Jane");
        assert_eq!(me["data"]["email"], "jane@example.com");
        assert_eq!(me["data"]["role"], "publisher");
        assert!(me["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_role_defaults_to_user() {
        let app = spawn_app();
        let response = app
            .server
            .post(&url("/auth/register"))
            .json(&json!({"name": "Joe", "email": "joe@example.com", "password": "123456"}))
            .await;
        response.assert_status_ok();
        let token = response.json::<Value>()["token"].as_str().unwrap().to_string();

        let me: Value = app
            .server
            .get(&url("/auth/me"))
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(me["data"]["role"], "user");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = spawn_app();
        app.register("Jane", "user").await;

        let missing = app
            .server
            .post(&url("/auth/login"))
            .json(&json!({"email": "jane@example.com"}))
            .await;
        missing.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(missing.json::<Value>()["error"], "Please provide an email and password");

        for body in [
            json!({"email": "jane@example.com", "password": "wrong-password"}),
            json!({"email": "nobody@example.com", "password": "123456"}),
        ] {
            let response = app.server.post(&url("/auth/login")).json(&body).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(response.json::<Value>()["error"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn test_admin_cannot_self_register() {
        let app = spawn_app();
        let response = app
            .server
            .post(&url("/auth/register"))
            .json(&json!({
                "name": "Mallory",
                "email": "mallory@example.com",
                "password": "123456",
                "role": "admin"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Bootcamp Tests
// =============================================================================

mod bootcamp_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_bootcamp() {
        let app = spawn_app();
        let token = app.publisher().await;

        let created = app
            .create_bootcamp(&token, bootcamp_payload("Devworks Bootcamp", "02215"))
            .await;
        assert_eq!(created["slug"], "devworks-bootcamp");
        assert_eq!(created["photo"], "no-photo.jpg");
        assert_eq!(created["location"]["coordinates"], json!([-71.10228, 42.350846]));
        assert_eq!(created["location"]["city"], "Boston");
        assert!(created["user"].is_string());

        let id = created["id"].as_str().unwrap();
        let response = app.server.get(&url(&format!("/bootcamps/{}", id))).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Devworks Bootcamp");
    }

    #[tokio::test]
    async fn test_unknown_address_leaves_location_unset() {
        let app = spawn_app();
        let token = app.publisher().await;
        let created = app
            .create_bootcamp(&token, bootcamp_payload("Nowhere Academy", "99999"))
            .await;
        assert!(created.get("location").is_none());
    }

    #[tokio::test]
    async fn test_update_bootcamp_reslugs_and_relocates() {
        let app = spawn_app();
        let token = app.publisher().await;
        let created = app
            .create_bootcamp(&token, bootcamp_payload("Devworks", "02215"))
            .await;
        let id = created["id"].as_str().unwrap();

        let response = app
            .server
            .put(&url(&format!("/bootcamps/{}", id)))
            .authorization_bearer(&token)
            .json(&json!({"name": "Devworks Reloaded", "address": "5 Broadway 10001", "housing": false}))
            .await;
        response.assert_status_ok();
        let data = response.json::<Value>()["data"].clone();
        assert_eq!(data["slug"], "devworks-reloaded");
        assert_eq!(data["housing"], false);
        assert_eq!(data["location"]["city"], "New York");
        assert_eq!(data["description"], created["description"]);
    }

    #[tokio::test]
    async fn test_user_role_cannot_create() {
        let app = spawn_app();
        let token = app.register("Reader", "user").await;
        let response = app
            .server
            .post(&url("/bootcamps"))
            .authorization_bearer(&token)
            .json(&bootcamp_payload("Devworks", "02215"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(
            response.json::<Value>()["error"],
            "User role [user] is not authorized to access this route"
        );
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let app = spawn_app();
        let response = app
            .server
            .post(&url("/bootcamps"))
            .json(&bootcamp_payload("Devworks", "02215"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = app
            .server
            .post(&url("/bootcamps"))
            .authorization_bearer("not-a-jwt")
            .json(&bootcamp_payload("Devworks", "02215"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_bootcamp_removes_courses() {
        let app = spawn_app();
        let token = app.publisher().await;
        let bootcamp = app
            .create_bootcamp(&token, bootcamp_payload("Devworks", "02215"))
            .await;
        let id = bootcamp["id"].as_str().unwrap();
        let course = app
            .create_course(&token, id, course_payload("Front End", 8000.0))
            .await;

        let response = app
            .server
            .delete(&url(&format!("/bootcamps/{}", id)))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({"success": true, "data": {}}));

        app.server
            .get(&url(&format!("/bootcamps/{}", id)))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .get(&url(&format!("/courses/{}", course["id"].as_str().unwrap())))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bootcamps_in_radius() {
        let app = spawn_app();
        let token = app.publisher().await;
        app.create_bootcamp(&token, bootcamp_payload("Boston Code", "02215")).await;
        app.create_bootcamp(&token, bootcamp_payload("Cambridge Code", "02139")).await;
        app.create_bootcamp(&token, bootcamp_payload("Manhattan Code", "10001")).await;

        let response = app.server.get(&url("/bootcamps/radius/02215/10")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        let mut names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["Boston Code", "Cambridge Code"]);

        let everywhere: Value = app.server.get(&url("/bootcamps/radius/02215/500")).await.json();
        assert_eq!(everywhere["count"], 3);
    }

    #[tokio::test]
    async fn test_radius_rejects_bad_input() {
        let app = spawn_app();
        let response = app.server.get(&url("/bootcamps/radius/02215/far")).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Please provide a valid distance");

        let response = app.server.get(&url("/bootcamps/radius/99999/10")).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<Value>()["error"],
            "No location found for zipcode 99999"
        );
    }
}

// =============================================================================
// Photo Upload Tests
// =============================================================================

mod photo_tests {
    use super::*;

    async fn bootcamp_id(app: &TestApp, token: &str) -> String {
        let created = app
            .create_bootcamp(token, bootcamp_payload("Devworks", "02215"))
            .await;
        created["id"].as_str().unwrap().to_string()
    }

    fn image(bytes: Vec<u8>, mime: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes).file_name("avatar.png").mime_type(mime),
        )
    }

    #[tokio::test]
    async fn test_upload_photo_stores_file() {
        let app = spawn_app();
        let token = app.publisher().await;
        let id = bootcamp_id(&app, &token).await;

        let response = app
            .server
            .put(&url(&format!("/bootcamps/{}/photo", id)))
            .authorization_bearer(&token)
            .multipart(image(vec![0x89, b'P', b'N', b'G'], "image/png"))
            .await;
        response.assert_status_ok();
        let file_name = format!("photo_{}.png", id);
        assert_eq!(response.json::<Value>()["data"], file_name.as_str());

        let stored = std::fs::read(app.uploads.path().join(&file_name)).unwrap();
        assert_eq!(stored, [0x89, b'P', b'N', b'G']);

        let bootcamp: Value = app.server.get(&url(&format!("/bootcamps/{}", id))).await.json();
        assert_eq!(bootcamp["data"]["photo"], file_name.as_str());

        let served = app.server.get(&format!("/uploads/{}", file_name)).await;
        served.assert_status_ok();
        assert_eq!(served.as_bytes().as_ref(), [0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let app = spawn_app();
        let token = app.publisher().await;
        let id = bootcamp_id(&app, &token).await;

        let response = app
            .server
            .put(&url(&format!("/bootcamps/{}/photo", id)))
            .authorization_bearer(&token)
            .multipart(image(b"hello".to_vec(), "text/plain"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Please upload an image file");
    }

    #[tokio::test]
    async fn test_upload_rejects_large_files() {
        let app = spawn_app();
        let token = app.publisher().await;
        let id = bootcamp_id(&app, &token).await;

        let response = app
            .server
            .put(&url(&format!("/bootcamps/{}/photo", id)))
            .authorization_bearer(&token)
            .multipart(image(vec![0u8; 2048], "image/jpeg"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "Please upload an image less than 1024 bytes"
        );
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let app = spawn_app();
        let token = app.publisher().await;
        let id = bootcamp_id(&app, &token).await;

        let form = MultipartForm::new().add_text("caption", "no file here");
        let response = app
            .server
            .put(&url(&format!("/bootcamps/{}/photo", id)))
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "Please upload a file");
    }
}

// =============================================================================
// Course Tests
// =============================================================================

mod course_tests {
    use super::*;

    #[tokio::test]
    async fn test_course_lifecycle_updates_average_cost() {
        let app = spawn_app();
        let token = app.publisher().await;
        let bootcamp = app
            .create_bootcamp(&token, bootcamp_payload("Devworks", "02215"))
            .await;
        let bootcamp_id = bootcamp["id"].as_str().unwrap();
        let bootcamp_url = url(&format!("/bootcamps/{}", bootcamp_id));

        let first = app
            .create_course(&token, bootcamp_id, course_payload("Front End", 8000.0))
            .await;
        assert_eq!(first["bootcamp"], bootcamp_id);
        assert_eq!(first["weeks"], "8");
        app.create_course(&token, bootcamp_id, course_payload("Back End", 10001.0))
            .await;

        // ceil(9000.5 / 10) * 10
        let current: Value = app.server.get(&bootcamp_url).await.json();
        assert_eq!(current["data"]["averageCost"], 9010.0);

        let response = app
            .server
            .put(&url(&format!("/courses/{}", first["id"].as_str().unwrap())))
            .authorization_bearer(&token)
            .json(&json!({"tuition": 12001}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["title"], "Front End");
        let current: Value = app.server.get(&bootcamp_url).await.json();
        assert_eq!(current["data"]["averageCost"], 11010.0);

        let response = app
            .server
            .delete(&url(&format!("/courses/{}", first["id"].as_str().unwrap())))
            .authorization_bearer(&token)
            .await;
        response.assert_status_ok();
        let current: Value = app.server.get(&bootcamp_url).await.json();
        assert_eq!(current["data"]["averageCost"], 10010.0);
    }

    #[tokio::test]
    async fn test_bootcamp_courses() {
        let app = spawn_app();
        let token = app.publisher().await;
        let bootcamp = app
            .create_bootcamp(&token, bootcamp_payload("Devworks", "02215"))
            .await;
        let other = app
            .create_bootcamp(&token, bootcamp_payload("ModernTech", "02139"))
            .await;
        let bootcamp_id = bootcamp["id"].as_str().unwrap();
        app.create_course(&token, bootcamp_id, course_payload("Front End", 8000.0)).await;
        app.create_course(&token, bootcamp_id, course_payload("Back End", 9000.0)).await;
        app.create_course(&token, other["id"].as_str().unwrap(), course_payload("UX", 5000.0))
            .await;

        let response = app
            .server
            .get(&url(&format!("/bootcamps/{}/courses", bootcamp_id)))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["count"], 2);
        assert!(body["data"].as_array().unwrap().iter().all(|c| c["bootcamp"] == bootcamp_id));
    }

    #[tokio::test]
    async fn test_create_course_for_missing_bootcamp() {
        let app = spawn_app();
        let token = app.publisher().await;
        let missing = uuid::Uuid::new_v4();
        let response = app
            .server
            .post(&url(&format!("/bootcamps/{}/courses", missing)))
            .authorization_bearer(&token)
            .json(&course_payload("Front End", 8000.0))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<Value>()["error"],
            format!("Bootcamp not found with id of {}", missing)
        );
    }

    #[tokio::test]
    async fn test_course_validation() {
        let app = spawn_app();
        let token = app.publisher().await;
        let bootcamp = app
            .create_bootcamp(&token, bootcamp_payload("Devworks", "02215"))
            .await;
        let response = app
            .server
            .post(&url(&format!("/bootcamps/{}/courses", bootcamp["id"].as_str().unwrap())))
            .authorization_bearer(&token)
            .json(&json!({"title": "Front End", "minimumSkill": "expert"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
        assert!(error.contains("Please add a description"), "{}", error);
        assert!(error.contains("minimumSkill must be one of"), "{}", error);
    }
}
