//! Template attribute value persistence
//!
//! Mirrors the node side: replace-all is the only write path, executed in a
//! single transaction.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::models::{NewAttributeValue, TemplateAttribute, TemplateAttributeWithInfo};

#[derive(Clone, Debug)]
pub struct TemplateAttributeRepository {
    pool: SqlitePool,
}

impl TemplateAttributeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_by_template(&self, template_id: i64) -> Result<Vec<TemplateAttribute>> {
        sqlx::query_as::<_, TemplateAttribute>(
            r#"
            SELECT id, template_id, attribute_id, value, order_index, created_at
            FROM template_attributes WHERE template_id = ? ORDER BY id
            "#,
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list template attributes")
    }

    /// Values joined with their schema, ordered for display.
    pub async fn list_with_info(
        &self,
        template_id: i64,
    ) -> Result<Vec<TemplateAttributeWithInfo>> {
        sqlx::query_as::<_, TemplateAttributeWithInfo>(
            r#"
            SELECT ta.id, ta.template_id, ta.attribute_id, a.name, a.attribute_type,
                   ta.value, ta.order_index, ta.created_at
            FROM template_attributes ta
            JOIN attributes a ON a.id = ta.attribute_id
            WHERE ta.template_id = ?
            ORDER BY a.name, ta.order_index, ta.id
            "#,
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list template attributes with schema info")
    }

    /// Replace the template's complete attribute set in one transaction.
    pub async fn replace_all(
        &self,
        template_id: i64,
        values: &[NewAttributeValue],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query("DELETE FROM template_attributes WHERE template_id = ?")
            .bind(template_id)
            .execute(&mut *tx)
            .await
            .context("failed to clear existing template attributes")?;

        let now = Utc::now();
        for value in values {
            sqlx::query(
                r#"
                INSERT INTO template_attributes (template_id, attribute_id, value, order_index, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(template_id)
            .bind(value.attribute_id)
            .bind(&value.value)
            .bind(value.order_index)
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("failed to insert template attribute")?;
        }

        tx.commit()
            .await
            .context("failed to commit template attributes")?;
        debug!(template_id, count = values.len(), "replaced template attribute set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeType;
    use crate::database::{self, AttributeRepository, DomainRepository, TemplateRepository};
    use crate::models::CreateAttributeRequest;

    #[tokio::test]
    async fn test_replace_all_for_templates() {
        let pool = database::connect_in_memory().await.unwrap();
        let domain = DomainRepository::new(pool.clone())
            .create("bookmarks", "")
            .await
            .unwrap();
        let template = TemplateRepository::new(pool.clone())
            .create(domain.id, "reading-list", "{}", "", "")
            .await
            .unwrap();
        let attribute = AttributeRepository::new(pool.clone())
            .create(
                domain.id,
                &CreateAttributeRequest {
                    name: "topic".to_string(),
                    attribute_type: AttributeType::Tag,
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        let repo = TemplateAttributeRepository::new(pool);

        let set = vec![NewAttributeValue {
            attribute_id: attribute.id,
            value: "rust".to_string(),
            order_index: None,
        }];
        repo.replace_all(template.id, &set).await.unwrap();
        repo.replace_all(template.id, &set).await.unwrap();

        // Idempotent: re-sending the same set leaves exactly one row.
        let stored = repo.list_by_template(template.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value, "rust");
    }
}
