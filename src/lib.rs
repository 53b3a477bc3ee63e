//! url-db — domain-scoped URL store with a typed attribute engine
//!
//! Domains own attribute schemas, nodes (bookmarked URLs), and templates.
//! Values bound to a node or template are validated against the schema's
//! fixed type, normalized, and persisted as one atomic replace-all batch.
//!
//! ## Architecture
//!
//! Validation flows through one path:
//! caller -> `AttributeValueBinder` -> schema lookup -> `ValidatorRegistry`
//! -> normalized values -> single replace-all transaction.
//!
//! `TemplateConstraintValidator` is a second, independent layer that checks
//! candidate values against hints found in a domain's active templates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use url_db::attributes::ValidatorRegistry;
//! use url_db::config::Config;
//! use url_db::database::{
//!     AttributeRepository, DomainRepository, NodeAttributeRepository, NodeRepository,
//!     TemplateAttributeRepository, TemplateRepository,
//! };
//! use url_db::models::AttributeInput;
//! use url_db::services::AttributeValueBinder;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let pool = url_db::database::connect(&Config::from_env()).await?;
//! let binder = AttributeValueBinder::new(
//!     Arc::new(ValidatorRegistry::new()),
//!     DomainRepository::new(pool.clone()),
//!     NodeRepository::new(pool.clone()),
//!     TemplateRepository::new(pool.clone()),
//!     AttributeRepository::new(pool.clone()),
//!     NodeAttributeRepository::new(pool.clone()),
//!     TemplateAttributeRepository::new(pool),
//! );
//!
//! binder
//!     .set_node_attributes(
//!         1,
//!         &[AttributeInput {
//!             name: "category".to_string(),
//!             value: "Rust".to_string(),
//!             order_index: None,
//!         }],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

pub use attributes::{AttributeType, ValidationResult, ValidatorRegistry};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use services::{AttributeValidationResult, AttributeValueBinder, TemplateConstraintValidator};
