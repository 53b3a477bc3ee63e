//! Attribute schema persistence
//!
//! Schemas are scoped to a domain; `(domain_id, name)` is unique. The type
//! column never changes after insert — there is deliberately no update path
//! for it.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{Attribute, CreateAttributeRequest};

#[derive(Clone, Debug)]
pub struct AttributeRepository {
    pool: SqlitePool,
}

impl AttributeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        domain_id: i64,
        request: &CreateAttributeRequest,
    ) -> Result<Attribute> {
        let now = Utc::now();
        let attribute = sqlx::query_as::<_, Attribute>(
            r#"
            INSERT INTO attributes (domain_id, name, attribute_type, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, domain_id, name, attribute_type, description, created_at, updated_at
            "#,
        )
        .bind(domain_id)
        .bind(&request.name)
        .bind(request.attribute_type)
        .bind(&request.description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to create attribute '{}'", request.name))?;

        info!(
            attribute = %attribute.name,
            attribute_type = %attribute.attribute_type,
            domain_id,
            "created attribute schema"
        );
        Ok(attribute)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Attribute>> {
        sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, domain_id, name, attribute_type, description, created_at, updated_at
            FROM attributes WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch attribute by id")
    }

    /// Look up a schema by name, scoped to one domain. A schema with the same
    /// name in another domain is never returned.
    pub async fn get_by_name(&self, domain_id: i64, name: &str) -> Result<Option<Attribute>> {
        sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, domain_id, name, attribute_type, description, created_at, updated_at
            FROM attributes WHERE domain_id = ? AND name = ?
            "#,
        )
        .bind(domain_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch attribute by name")
    }

    pub async fn list_by_domain(&self, domain_id: i64) -> Result<Vec<Attribute>> {
        sqlx::query_as::<_, Attribute>(
            r#"
            SELECT id, domain_id, name, attribute_type, description, created_at, updated_at
            FROM attributes WHERE domain_id = ? ORDER BY name
            "#,
        )
        .bind(domain_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list attributes for domain")
    }

    /// The description is the only mutable field of a schema.
    pub async fn update_description(
        &self,
        id: i64,
        description: &str,
    ) -> Result<Option<Attribute>> {
        sqlx::query_as::<_, Attribute>(
            r#"
            UPDATE attributes
            SET description = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, domain_id, name, attribute_type, description, created_at, updated_at
            "#,
        )
        .bind(description)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to update attribute description")
    }
}
