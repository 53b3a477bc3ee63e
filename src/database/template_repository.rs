//! Template persistence

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::Template;

#[derive(Clone, Debug)]
pub struct TemplateRepository {
    pool: SqlitePool,
}

impl TemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        domain_id: i64,
        name: &str,
        template_data: &str,
        title: &str,
        description: &str,
    ) -> Result<Template> {
        let now = Utc::now();
        let template = sqlx::query_as::<_, Template>(
            r#"
            INSERT INTO templates (domain_id, name, template_data, title, description, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING id, domain_id, name, template_data, title, description, is_active, created_at, updated_at
            "#,
        )
        .bind(domain_id)
        .bind(name)
        .bind(template_data)
        .bind(title)
        .bind(description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to create template '{name}'"))?;

        info!(template = %template.name, domain_id, "created template");
        Ok(template)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Template>> {
        sqlx::query_as::<_, Template>(
            r#"
            SELECT id, domain_id, name, template_data, title, description, is_active, created_at, updated_at
            FROM templates WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch template by id")
    }

    pub async fn get_by_name(&self, domain_id: i64, name: &str) -> Result<Option<Template>> {
        sqlx::query_as::<_, Template>(
            r#"
            SELECT id, domain_id, name, template_data, title, description, is_active, created_at, updated_at
            FROM templates WHERE domain_id = ? AND name = ?
            "#,
        )
        .bind(domain_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch template by name")
    }

    /// Active templates in listing order: most recently updated first. This
    /// is the order constraint scanning walks.
    pub async fn list_active_by_domain(&self, domain_id: i64) -> Result<Vec<Template>> {
        sqlx::query_as::<_, Template>(
            r#"
            SELECT id, domain_id, name, template_data, title, description, is_active, created_at, updated_at
            FROM templates
            WHERE domain_id = ? AND is_active = 1
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(domain_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list active templates")
    }

    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<Option<Template>> {
        sqlx::query_as::<_, Template>(
            r#"
            UPDATE templates
            SET is_active = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, domain_id, name, template_data, title, description, is_active, created_at, updated_at
            "#,
        )
        .bind(is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to update template active flag")
    }
}
