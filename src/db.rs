// src/db.rs

use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use crate::{config::Config, error::AppError, utils::hash::hash_password};

const CONNECT_ATTEMPTS: u32 = 5;

/// Opens the pool, retrying while the database is not reachable yet.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                retry_count += 1;
                if retry_count >= CONNECT_ATTEMPTS {
                    return Err(e);
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

/// Applies the embedded schema.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Creates the configured admin account unless it already exists.
///
/// Returns `true` when a row was inserted.
pub async fn seed_admin(pool: &SqlitePool, config: &Config) -> Result<bool, AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(false);
    };

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM admins WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if exists.is_some() {
        tracing::info!("Admin {} already exists", email);
        return Ok(false);
    }

    tracing::info!("Seeding admin user: {}", email);
    let hashed_password = hash_password(password)?;

    sqlx::query("INSERT INTO admins (email, password, created_at) VALUES (?, ?, ?)")
        .bind(email)
        .bind(hashed_password)
        .bind(chrono::Utc::now())
        .execute(pool)
        .await?;

    tracing::info!("Admin user created successfully.");
    Ok(true)
}
