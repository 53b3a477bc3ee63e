//! Domain persistence

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::Domain;

#[derive(Clone, Debug)]
pub struct DomainRepository {
    pool: SqlitePool,
}

impl DomainRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, description: &str) -> Result<Domain> {
        let now = Utc::now();
        let domain = sqlx::query_as::<_, Domain>(
            r#"
            INSERT INTO domains (name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to create domain '{name}'"))?;

        info!(domain = %domain.name, id = domain.id, "created domain");
        Ok(domain)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Domain>> {
        sqlx::query_as::<_, Domain>(
            "SELECT id, name, description, created_at, updated_at FROM domains WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch domain by id")
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Domain>> {
        sqlx::query_as::<_, Domain>(
            "SELECT id, name, description, created_at, updated_at FROM domains WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch domain by name")
    }

    pub async fn list(&self) -> Result<Vec<Domain>> {
        sqlx::query_as::<_, Domain>(
            "SELECT id, name, description, created_at, updated_at FROM domains ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list domains")
    }
}
