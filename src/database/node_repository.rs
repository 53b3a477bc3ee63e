//! Node persistence

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{Domain, Node};

#[derive(Clone, Debug)]
pub struct NodeRepository {
    pool: SqlitePool,
}

impl NodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        domain_id: i64,
        url: &str,
        title: &str,
        description: &str,
    ) -> Result<Node> {
        let now = Utc::now();
        let node = sqlx::query_as::<_, Node>(
            r#"
            INSERT INTO nodes (domain_id, url, title, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, domain_id, url, title, description, created_at, updated_at
            "#,
        )
        .bind(domain_id)
        .bind(url)
        .bind(title)
        .bind(description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to create node for '{url}'"))?;

        info!(node_id = node.id, domain_id, "created node");
        Ok(node)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Node>> {
        sqlx::query_as::<_, Node>(
            r#"
            SELECT id, domain_id, url, title, description, created_at, updated_at
            FROM nodes WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch node by id")
    }

    /// Resolve the domain a node belongs to.
    pub async fn get_domain_for_node(&self, node_id: i64) -> Result<Option<Domain>> {
        sqlx::query_as::<_, Domain>(
            r#"
            SELECT d.id, d.name, d.description, d.created_at, d.updated_at
            FROM domains d
            JOIN nodes n ON n.domain_id = d.id
            WHERE n.id = ?
            "#,
        )
        .bind(node_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to resolve domain for node")
    }

    pub async fn list_by_domain(&self, domain_id: i64) -> Result<Vec<Node>> {
        sqlx::query_as::<_, Node>(
            r#"
            SELECT id, domain_id, url, title, description, created_at, updated_at
            FROM nodes WHERE domain_id = ? ORDER BY id
            "#,
        )
        .bind(domain_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to list nodes for domain")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{self, DomainRepository};

    #[tokio::test]
    async fn test_node_domain_resolution() {
        let pool = database::connect_in_memory().await.unwrap();
        let domains = DomainRepository::new(pool.clone());
        let nodes = NodeRepository::new(pool);

        let domain = domains.create("bookmarks", "").await.unwrap();
        let node = nodes
            .create(domain.id, "https://example.com", "Example", "")
            .await
            .unwrap();

        let resolved = nodes.get_domain_for_node(node.id).await.unwrap().unwrap();
        assert_eq!(resolved.id, domain.id);

        assert!(nodes.get_domain_for_node(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_node_url_unique_per_domain() {
        let pool = database::connect_in_memory().await.unwrap();
        let domains = DomainRepository::new(pool.clone());
        let nodes = NodeRepository::new(pool);

        let a = domains.create("a", "").await.unwrap();
        let b = domains.create("b", "").await.unwrap();

        nodes.create(a.id, "https://example.com", "", "").await.unwrap();
        assert!(nodes.create(a.id, "https://example.com", "", "").await.is_err());
        // Same URL in a different domain is fine.
        nodes.create(b.id, "https://example.com", "", "").await.unwrap();
    }
}
