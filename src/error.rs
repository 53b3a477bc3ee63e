//! Error handling for the attribute engine
//!
//! Service-level failures carry a stable machine-readable code so transport
//! layers can map them 1:1 onto their own response envelopes.

use thiserror::Error;

/// Stable error-code vocabulary surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    Conflict,
    BusinessRuleViolation,
    ConstraintViolation,
    TemplateInactive,
    NotFound,
    UnsupportedType,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::Conflict => "conflict",
            ErrorCode::BusinessRuleViolation => "business_rule_violation",
            ErrorCode::ConstraintViolation => "constraint_violation",
            ErrorCode::TemplateInactive => "template_inactive",
            ErrorCode::NotFound => "not_found",
            ErrorCode::UnsupportedType => "unsupported_type",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for attribute services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("validation failed for attribute '{attribute}': {message}")]
    Validation {
        attribute: String,
        code: ErrorCode,
        message: String,
    },

    #[error("attribute '{name}' not defined in domain '{domain}'")]
    AttributeNotDefined { name: String, domain: String },

    #[error("attribute '{name}' belongs to domain {attribute_domain_id}, owner belongs to domain {owner_domain_id}")]
    DomainMismatch {
        name: String,
        attribute_domain_id: i64,
        owner_domain_id: i64,
    },

    #[error("attribute '{name}' already exists in domain {domain_id}")]
    DuplicateAttribute { name: String, domain_id: i64 },

    #[error("duplicate value '{value}' for attribute '{attribute}'")]
    DuplicateValue { attribute: String, value: String },

    #[error("duplicate order_index {order_index} for attribute '{attribute}'")]
    DuplicateOrderIndex { attribute: String, order_index: i64 },

    #[error("attribute '{attribute}' accepts a single value per owner")]
    SingleValueViolation { attribute: String },

    #[error("unsupported attribute type: {0}")]
    UnsupportedType(String),

    #[error("domain not found: {0}")]
    DomainNotFound(i64),

    #[error("node not found: {0}")]
    NodeNotFound(i64),

    #[error("template not found: {0}")]
    TemplateNotFound(i64),

    #[error("template '{name}' already exists in domain {domain_id}")]
    DuplicateTemplate { name: String, domain_id: i64 },

    #[error("template '{name}' is inactive and read-only")]
    TemplateInactive { name: String },

    #[error("template '{name}' is already {state}")]
    TemplateAlreadyInState { name: String, state: &'static str },

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

impl ServiceError {
    /// The stable code for this failure, if it is a domain-level error.
    /// Persistence failures have no code and are surfaced as-is.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ServiceError::Validation { code, .. } => Some(*code),
            ServiceError::InvalidTemplate(_) => Some(ErrorCode::ValidationError),
            ServiceError::DuplicateAttribute { .. }
            | ServiceError::DuplicateTemplate { .. }
            | ServiceError::DuplicateValue { .. }
            | ServiceError::TemplateAlreadyInState { .. } => Some(ErrorCode::Conflict),
            ServiceError::DomainMismatch { .. } => Some(ErrorCode::BusinessRuleViolation),
            ServiceError::DuplicateOrderIndex { .. }
            | ServiceError::SingleValueViolation { .. } => Some(ErrorCode::ConstraintViolation),
            ServiceError::TemplateInactive { .. } => Some(ErrorCode::TemplateInactive),
            ServiceError::AttributeNotDefined { .. }
            | ServiceError::DomainNotFound(_)
            | ServiceError::NodeNotFound(_)
            | ServiceError::TemplateNotFound(_) => Some(ErrorCode::NotFound),
            ServiceError::UnsupportedType(_) => Some(ErrorCode::UnsupportedType),
            ServiceError::Database(_) => None,
        }
    }
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "validation_error");
        assert_eq!(
            ErrorCode::BusinessRuleViolation.as_str(),
            "business_rule_violation"
        );
        assert_eq!(ErrorCode::TemplateInactive.as_str(), "template_inactive");
    }

    #[test]
    fn test_service_error_maps_to_code() {
        let err = ServiceError::SingleValueViolation {
            attribute: "rating".to_string(),
        };
        assert_eq!(err.code(), Some(ErrorCode::ConstraintViolation));

        let err = ServiceError::AttributeNotDefined {
            name: "category".to_string(),
            domain: "bookmarks".to_string(),
        };
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[test]
    fn test_database_error_has_no_code() {
        let err = ServiceError::Database(anyhow::anyhow!("connection reset"));
        assert_eq!(err.code(), None);
    }
}
