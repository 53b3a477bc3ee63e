//! Attribute schema and attribute value models
//!
//! An `Attribute` is the domain-scoped declaration of a name and a fixed
//! type. `NodeAttribute` / `TemplateAttribute` rows hold concrete values
//! bound to an owner; the stored value is always the validator's normalized
//! form, never the raw input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::attributes::AttributeType;

/// Domain-level attribute declaration. `attribute_type` and `domain_id` are
/// fixed at creation; only the description can change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attribute {
    pub id: i64,
    pub domain_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to declare a new attribute in a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttributeRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub description: String,
}

/// A typed value bound to a node.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NodeAttribute {
    pub id: i64,
    pub node_id: i64,
    pub attribute_id: i64,
    pub value: String,
    pub order_index: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A typed value bound to a template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateAttribute {
    pub id: i64,
    pub template_id: i64,
    pub attribute_id: i64,
    pub value: String,
    pub order_index: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A node's attribute value joined with its schema name and type, the shape
/// read paths hand to transport layers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NodeAttributeWithInfo {
    pub id: i64,
    pub node_id: i64,
    pub attribute_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub value: String,
    pub order_index: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A template's attribute value joined with its schema name and type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateAttributeWithInfo {
    pub id: i64,
    pub template_id: i64,
    pub attribute_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub value: String,
    pub order_index: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One tuple of a `SetAttributes` batch as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeInput {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

/// A validated, normalized value ready for insertion. Produced only by the
/// binder after every check in the batch has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttributeValue {
    pub attribute_id: i64,
    pub value: String,
    pub order_index: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_input_deserializes_without_order_index() {
        let input: AttributeInput =
            serde_json::from_str(r#"{"name":"category","value":"rust"}"#).unwrap();
        assert_eq!(input.name, "category");
        assert_eq!(input.order_index, None);
    }

    #[test]
    fn test_attribute_type_serializes_snake_case() {
        let req = CreateAttributeRequest {
            name: "steps".to_string(),
            attribute_type: AttributeType::OrderedTag,
            description: String::new(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "ordered_tag");
    }
}
