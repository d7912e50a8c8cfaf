#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use migration::{Migrator, MigratorTrait};
use orphanages::{config::AppConfig, create_app, AppState};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Once;

pub const BOUNDARY: &str = "orphanages-test-boundary";

// For initializing tracing once
static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// Fresh in-memory database with every migration applied.
pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Application router over a fresh database, plus a handle to that database.
pub async fn test_app() -> (Router, DatabaseConnection) {
    test_app_with(AppConfig::for_tests("sqlite::memory:")).await
}

/// Like [`test_app`], with a caller-tuned configuration.
pub async fn test_app_with(config: AppConfig) -> (Router, DatabaseConnection) {
    setup();
    let db = test_db().await;
    let app = create_app(AppState::new(db.clone(), config));
    (app, db)
}

pub fn lar_feliz_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Lar Feliz"),
        ("latitude", "-27.21"),
        ("longitude", "-49.64"),
        ("about", "Casa de acolhimento para crianças"),
        ("instructions", "bring ID"),
        ("opening_hours", "08:00-18:00"),
        ("open_on_weekends", "true"),
    ]
}

/// Builds a `multipart/form-data` POST. Files are `(field, file name, bytes)`.
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
