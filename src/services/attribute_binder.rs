//! Attribute value binding: the "set attributes" operation
//!
//! Given an owner (node or template) and a batch of `{name, value,
//! order_index?}` tuples, the binder resolves each name to a schema scoped to
//! the owner's domain, runs the type validator, checks the batch for internal
//! conflicts, and only then persists the full set as one replace-all
//! transaction. Any failure aborts the whole batch with no partial writes.
//!
//! There is no per-attribute incremental update path: callers that want to
//! change one value resend the complete desired set.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::attributes::{AttributeType, ValidationResult, ValidatorRegistry};
use crate::database::{
    AttributeRepository, DomainRepository, NodeAttributeRepository, NodeRepository,
    TemplateAttributeRepository, TemplateRepository,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    AttributeInput, Domain, NewAttributeValue, NodeAttributeWithInfo, TemplateAttributeWithInfo,
};

#[derive(Clone)]
pub struct AttributeValueBinder {
    registry: Arc<ValidatorRegistry>,
    domain_repo: DomainRepository,
    node_repo: NodeRepository,
    template_repo: TemplateRepository,
    attribute_repo: AttributeRepository,
    node_attribute_repo: NodeAttributeRepository,
    template_attribute_repo: TemplateAttributeRepository,
}

impl AttributeValueBinder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<ValidatorRegistry>,
        domain_repo: DomainRepository,
        node_repo: NodeRepository,
        template_repo: TemplateRepository,
        attribute_repo: AttributeRepository,
        node_attribute_repo: NodeAttributeRepository,
        template_attribute_repo: TemplateAttributeRepository,
    ) -> Self {
        Self {
            registry,
            domain_repo,
            node_repo,
            template_repo,
            attribute_repo,
            node_attribute_repo,
            template_attribute_repo,
        }
    }

    /// Replace a node's complete attribute set.
    pub async fn set_node_attributes(
        &self,
        node_id: i64,
        inputs: &[AttributeInput],
    ) -> ServiceResult<()> {
        let node = self
            .node_repo
            .get_by_id(node_id)
            .await?
            .ok_or(ServiceError::NodeNotFound(node_id))?;
        let domain = self
            .node_repo
            .get_domain_for_node(node_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(node.domain_id))?;

        let values = self.resolve_and_validate(&domain, inputs).await?;
        self.node_attribute_repo.replace_all(node_id, &values).await?;

        info!(node_id, count = values.len(), "bound node attributes");
        Ok(())
    }

    /// Replace a template's complete attribute set. Inactive templates are
    /// read-only and rejected before any tuple is looked at.
    pub async fn set_template_attributes(
        &self,
        template_id: i64,
        inputs: &[AttributeInput],
    ) -> ServiceResult<()> {
        let template = self
            .template_repo
            .get_by_id(template_id)
            .await?
            .ok_or(ServiceError::TemplateNotFound(template_id))?;
        if !template.can_modify() {
            return Err(ServiceError::TemplateInactive {
                name: template.name,
            });
        }
        let domain = self
            .domain_repo
            .get_by_id(template.domain_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(template.domain_id))?;

        let values = self.resolve_and_validate(&domain, inputs).await?;
        self.template_attribute_repo
            .replace_all(template_id, &values)
            .await?;

        info!(template_id, count = values.len(), "bound template attributes");
        Ok(())
    }

    /// A node's stored values joined with schema name and type.
    pub async fn list_node_attributes(
        &self,
        node_id: i64,
    ) -> ServiceResult<Vec<NodeAttributeWithInfo>> {
        self.node_repo
            .get_by_id(node_id)
            .await?
            .ok_or(ServiceError::NodeNotFound(node_id))?;
        Ok(self.node_attribute_repo.list_with_info(node_id).await?)
    }

    /// A template's stored values joined with schema name and type.
    pub async fn list_template_attributes(
        &self,
        template_id: i64,
    ) -> ServiceResult<Vec<TemplateAttributeWithInfo>> {
        self.template_repo
            .get_by_id(template_id)
            .await?
            .ok_or(ServiceError::TemplateNotFound(template_id))?;
        Ok(self
            .template_attribute_repo
            .list_with_info(template_id)
            .await?)
    }

    /// Nodes in a domain carrying the named attribute, optionally narrowed to
    /// one value. The probe value goes through the same normalization as
    /// stored values so `"Rust"` finds nodes tagged `"rust"`.
    pub async fn find_nodes(
        &self,
        domain_id: i64,
        attribute_name: &str,
        value: Option<&str>,
    ) -> ServiceResult<Vec<i64>> {
        let domain = self
            .domain_repo
            .get_by_id(domain_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(domain_id))?;
        let schema = self
            .attribute_repo
            .get_by_name(domain.id, attribute_name)
            .await?
            .ok_or_else(|| ServiceError::AttributeNotDefined {
                name: attribute_name.to_string(),
                domain: domain.name.clone(),
            })?;

        let normalized = match value {
            Some(raw) => {
                // Ordered tags need an index to validate; any non-negative
                // one yields the same normalization.
                let order_hint = match schema.attribute_type {
                    AttributeType::OrderedTag => Some(0),
                    _ => None,
                };
                match self.registry.validate(schema.attribute_type, raw, order_hint) {
                    ValidationResult::Valid { normalized_value } => Some(normalized_value),
                    ValidationResult::Invalid { code, message } => {
                        return Err(ServiceError::Validation {
                            attribute: attribute_name.to_string(),
                            code,
                            message,
                        })
                    }
                }
            }
            None => None,
        };

        Ok(self
            .node_attribute_repo
            .nodes_with_attribute(schema.id, normalized.as_deref())
            .await?)
    }

    /// Resolve every tuple against the domain's schemas and validate it.
    /// Returns the normalized set only if the entire batch is acceptable.
    async fn resolve_and_validate(
        &self,
        domain: &Domain,
        inputs: &[AttributeInput],
    ) -> ServiceResult<Vec<NewAttributeValue>> {
        let mut values = Vec::with_capacity(inputs.len());
        let mut seen_values: HashSet<(i64, String)> = HashSet::new();
        let mut seen_order: HashSet<(i64, i64)> = HashSet::new();
        let mut seen_single: HashSet<i64> = HashSet::new();

        for input in inputs {
            let schema = self
                .attribute_repo
                .get_by_name(domain.id, &input.name)
                .await?
                .ok_or_else(|| ServiceError::AttributeNotDefined {
                    name: input.name.clone(),
                    domain: domain.name.clone(),
                })?;

            // The lookup is domain-scoped, so this only fires on storage
            // inconsistency; it must never silently pass.
            if schema.domain_id != domain.id {
                return Err(ServiceError::DomainMismatch {
                    name: input.name.clone(),
                    attribute_domain_id: schema.domain_id,
                    owner_domain_id: domain.id,
                });
            }

            let normalized = match self.registry.validate(
                schema.attribute_type,
                &input.value,
                input.order_index,
            ) {
                ValidationResult::Valid { normalized_value } => normalized_value,
                ValidationResult::Invalid { code, message } => {
                    debug!(attribute = %input.name, %code, "rejected attribute value");
                    return Err(ServiceError::Validation {
                        attribute: input.name.clone(),
                        code,
                        message,
                    });
                }
            };

            if !seen_values.insert((schema.id, normalized.clone())) {
                return Err(ServiceError::DuplicateValue {
                    attribute: input.name.clone(),
                    value: normalized,
                });
            }

            if schema.attribute_type == AttributeType::OrderedTag {
                if let Some(order_index) = input.order_index {
                    if !seen_order.insert((schema.id, order_index)) {
                        return Err(ServiceError::DuplicateOrderIndex {
                            attribute: input.name.clone(),
                            order_index,
                        });
                    }
                }
            } else if !schema.attribute_type.is_multi_valued()
                && !seen_single.insert(schema.id)
            {
                return Err(ServiceError::SingleValueViolation {
                    attribute: input.name.clone(),
                });
            }

            values.push(NewAttributeValue {
                attribute_id: schema.id,
                value: normalized,
                order_index: input.order_index,
            });
        }

        Ok(values)
    }
}
