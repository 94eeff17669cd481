use std::time::Duration;

use anyhow::{bail, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Tables the service reads and writes. Created by `migrations/0001_job_tracker.sql`.
const REQUIRED_TABLES: [&str; 2] = ["job_records", "resume_documents"];

/// Creates a PostgreSQL pool and checks that the job tracker schema is present.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    for table in REQUIRED_TABLES {
        let present: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(table)
            .fetch_one(&pool)
            .await?;
        if !present {
            bail!("Table '{table}' is missing; apply apps/api/migrations before starting");
        }
    }

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
