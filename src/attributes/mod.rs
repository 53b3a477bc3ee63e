//! Typed attribute validation engine
//!
//! Every attribute declared by a domain has one of six fixed types. Each type
//! owns a validator that decides whether a raw value (plus an optional order
//! index) is acceptable and what normalized form gets stored. The registry is
//! constructed once with all built-in validators and shared read-only; it
//! holds no mutable state after construction.

mod validators;

pub use validators::{
    ImageValidator, MarkdownValidator, NumberValidator, OrderedTagValidator, StringValidator,
    TagValidator,
};

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ErrorCode;

/// The closed set of attribute types a domain can declare.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttributeType {
    Tag,
    OrderedTag,
    Number,
    String,
    Markdown,
    Image,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Tag => "tag",
            AttributeType::OrderedTag => "ordered_tag",
            AttributeType::Number => "number",
            AttributeType::String => "string",
            AttributeType::Markdown => "markdown",
            AttributeType::Image => "image",
        }
    }

    /// Whether an owner may carry more than one value of this type per
    /// attribute. Only the tag family is multi-valued.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, AttributeType::Tag | AttributeType::OrderedTag)
    }
}

impl FromStr for AttributeType {
    type Err = crate::error::ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(AttributeType::Tag),
            "ordered_tag" => Ok(AttributeType::OrderedTag),
            "number" => Ok(AttributeType::Number),
            "string" => Ok(AttributeType::String),
            "markdown" => Ok(AttributeType::Markdown),
            "image" => Ok(AttributeType::Image),
            other => Err(crate::error::ServiceError::UnsupportedType(
                other.to_string(),
            )),
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating a single attribute value.
///
/// Either the value is acceptable and `normalized_value` is what must be
/// stored, or it is rejected with a code and message. A half-filled result is
/// unrepresentable by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid { normalized_value: String },
    Invalid { code: ErrorCode, message: String },
}

impl ValidationResult {
    pub fn valid(normalized_value: impl Into<String>) -> Self {
        ValidationResult::Valid {
            normalized_value: normalized_value.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ValidationResult::Invalid {
            code: ErrorCode::ValidationError,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    pub fn normalized_value(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid { normalized_value } => Some(normalized_value),
            ValidationResult::Invalid { .. } => None,
        }
    }
}

/// Behaviour shared by all attribute type validators.
///
/// Validators are deterministic, side-effect free, and independent of
/// persistence; malformed input is a normal `Invalid` outcome, never a panic.
pub trait AttributeValidator: Send + Sync {
    fn validate(&self, value: &str, order_index: Option<i64>) -> ValidationResult;
    fn attribute_type(&self) -> AttributeType;
    fn description(&self) -> &'static str;
}

/// Registry owning exactly one validator per attribute type.
pub struct ValidatorRegistry {
    validators: HashMap<AttributeType, Box<dyn AttributeValidator>>,
}

impl ValidatorRegistry {
    /// Build a registry with all six built-in validators registered.
    pub fn new() -> Self {
        let mut registry = Self {
            validators: HashMap::new(),
        };
        registry.register(Box::new(TagValidator));
        registry.register(Box::new(OrderedTagValidator));
        registry.register(Box::new(NumberValidator));
        registry.register(Box::new(StringValidator));
        registry.register(Box::new(MarkdownValidator));
        registry.register(Box::new(ImageValidator));
        registry
    }

    // Registration is construction-only; the registry is immutable afterwards.
    fn register(&mut self, validator: Box<dyn AttributeValidator>) {
        self.validators.insert(validator.attribute_type(), validator);
    }

    /// Validate a value against the validator for `attr_type`. An unregistered
    /// type yields an `unsupported_type` outcome rather than a panic.
    pub fn validate(
        &self,
        attr_type: AttributeType,
        value: &str,
        order_index: Option<i64>,
    ) -> ValidationResult {
        match self.validators.get(&attr_type) {
            Some(validator) => validator.validate(value, order_index),
            None => ValidationResult::Invalid {
                code: ErrorCode::UnsupportedType,
                message: format!("unsupported attribute type: {attr_type}"),
            },
        }
    }

    /// All types this registry can validate.
    pub fn supported_types(&self) -> Vec<AttributeType> {
        self.validators.keys().copied().collect()
    }

    /// Human description of a type, if registered.
    pub fn describe(&self, attr_type: AttributeType) -> Option<&'static str> {
        self.validators.get(&attr_type).map(|v| v.description())
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_type_round_trip() {
        for s in ["tag", "ordered_tag", "number", "string", "markdown", "image"] {
            let parsed: AttributeType = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let err = "geo_point".parse::<AttributeType>().unwrap_err();
        assert_eq!(
            err.code(),
            Some(crate::error::ErrorCode::UnsupportedType)
        );
    }

    #[test]
    fn test_registry_registers_all_builtins() {
        let registry = ValidatorRegistry::new();
        let mut types = registry.supported_types();
        types.sort_by_key(|t| t.as_str());
        assert_eq!(types.len(), 6);
    }

    #[test]
    fn test_registry_dispatches_by_type() {
        let registry = ValidatorRegistry::new();

        let result = registry.validate(AttributeType::Tag, "Rust", None);
        assert_eq!(result.normalized_value(), Some("rust"));

        let result = registry.validate(AttributeType::Number, "3.14", None);
        assert_eq!(result.normalized_value(), Some("3.14"));
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<ValidatorRegistry>();
    }

    #[test]
    fn test_multi_valued_types() {
        assert!(AttributeType::Tag.is_multi_valued());
        assert!(AttributeType::OrderedTag.is_multi_valued());
        assert!(!AttributeType::Number.is_multi_valued());
        assert!(!AttributeType::Markdown.is_multi_valued());
    }
}
