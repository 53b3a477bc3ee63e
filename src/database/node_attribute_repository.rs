//! Node attribute value persistence
//!
//! The only write path is `replace_all`: the owner's rows are deleted and the
//! new set inserted inside one transaction, so callers either see the
//! previous set or the complete new one, never a mix.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::models::{NewAttributeValue, NodeAttribute, NodeAttributeWithInfo};

#[derive(Clone, Debug)]
pub struct NodeAttributeRepository {
    pool: SqlitePool,
}

impl NodeAttributeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_by_node(&self, node_id: i64) -> Result<Vec<NodeAttribute>> {
        sqlx::query_as::<_, NodeAttribute>(
            r#"
            SELECT id, node_id, attribute_id, value, order_index, created_at
            FROM node_attributes WHERE node_id = ? ORDER BY id
            "#,
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list node attributes")
    }

    /// Values joined with their schema, ordered for display: by attribute
    /// name, then by order index within ordered attributes.
    pub async fn list_with_info(&self, node_id: i64) -> Result<Vec<NodeAttributeWithInfo>> {
        sqlx::query_as::<_, NodeAttributeWithInfo>(
            r#"
            SELECT na.id, na.node_id, na.attribute_id, a.name, a.attribute_type,
                   na.value, na.order_index, na.created_at
            FROM node_attributes na
            JOIN attributes a ON a.id = na.attribute_id
            WHERE na.node_id = ?
            ORDER BY a.name, na.order_index, na.id
            "#,
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list node attributes with schema info")
    }

    /// Replace the node's complete attribute set in one transaction.
    pub async fn replace_all(&self, node_id: i64, values: &[NewAttributeValue]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query("DELETE FROM node_attributes WHERE node_id = ?")
            .bind(node_id)
            .execute(&mut *tx)
            .await
            .context("failed to clear existing node attributes")?;

        let now = Utc::now();
        for value in values {
            sqlx::query(
                r#"
                INSERT INTO node_attributes (node_id, attribute_id, value, order_index, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(node_id)
            .bind(value.attribute_id)
            .bind(&value.value)
            .bind(value.order_index)
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("failed to insert node attribute")?;
        }

        tx.commit().await.context("failed to commit node attributes")?;
        debug!(node_id, count = values.len(), "replaced node attribute set");
        Ok(())
    }

    /// Node ids carrying a given attribute, optionally narrowed to an exact
    /// stored (normalized) value.
    pub async fn nodes_with_attribute(
        &self,
        attribute_id: i64,
        value: Option<&str>,
    ) -> Result<Vec<i64>> {
        let rows: Vec<i64> = match value {
            Some(value) => {
                sqlx::query_scalar(
                    r#"
                    SELECT DISTINCT node_id FROM node_attributes
                    WHERE attribute_id = ? AND value = ?
                    ORDER BY node_id
                    "#,
                )
                .bind(attribute_id)
                .bind(value)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar(
                    r#"
                    SELECT DISTINCT node_id FROM node_attributes
                    WHERE attribute_id = ?
                    ORDER BY node_id
                    "#,
                )
                .bind(attribute_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("failed to query nodes by attribute")?;

        Ok(rows)
    }
}
