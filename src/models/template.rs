//! Template model: a reusable structured JSON record within a domain.
//!
//! Inactive templates are read-only: they keep their data but reject
//! attribute writes and are skipped by constraint scanning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Template {
    pub id: i64,
    pub domain_id: i64,
    pub name: String,
    /// JSON document; shape is caller-defined apart from the constraint
    /// sections the validator understands.
    pub template_data: String,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Only active templates accept modifications.
    pub fn can_modify(&self) -> bool {
        self.is_active
    }

    /// Parse the stored JSON payload.
    pub fn data(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.template_data)
    }
}
