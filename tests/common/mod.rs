// tests/common/mod.rs

#![allow(dead_code)]

use std::path::PathBuf;

use exam_portal::{config::Config, db, routes, state::AppState};
use sqlx::sqlite::SqlitePoolOptions;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Admin@098";

pub struct TestApp {
    /// Base URL, e.g. "http://127.0.0.1:12345".
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a candidate with a unique email and returns `(id, email)`.
    pub async fn register_candidate(&self) -> (i64, String) {
        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        let response = self
            .client
            .post(self.url("/register"))
            .json(&serde_json::json!({
                "fullname": "Test Candidate",
                "email": email,
                "dob": "2001-02-03",
                "contact": "5550101",
                "gender": "Female",
                "school": "Central High"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.expect("Failed to parse json");
        (body["id"].as_i64().expect("id missing"), email)
    }
}

/// Writes a small question file and returns its path.
pub fn write_questions(count: u32) -> PathBuf {
    let questions: Vec<serde_json::Value> = (1..=count)
        .map(|n| {
            serde_json::json!({
                "questionNumber": n,
                "title": format!("Question {}", n),
                "description": "Print the sum of two integers.",
                "difficulty": "Easy",
                "topic": "Math",
                "testCases": [{ "input": "1 2", "expectedOutput": "3" }]
            })
        })
        .collect();

    let name = format!("exam-portal-questions-{}.json", uuid::Uuid::new_v4());
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, serde_json::to_vec(&questions).unwrap())
        .expect("Failed to write questions");
    path
}

/// Spawns the app on a random port against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single connection that never recycles keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    db::migrate(&pool).await.expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        questions_file: write_questions(3).to_string_lossy().into_owned(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    };

    db::seed_admin(&pool, &config).await.expect("Failed to seed admin");

    let app = routes::create_router(AppState { pool, config });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}
