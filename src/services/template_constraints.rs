//! Template-derived attribute constraints
//!
//! A second validation layer on top of the type validators: a domain's active
//! templates can carry structural hints about named attributes, and callers
//! that want template-aware checking run candidate values through this
//! validator. It never sits inside the binder's critical path.
//!
//! The search order within each template is fixed: a direct
//! `attributes[name]` entry, then `schema.properties[name]`, then
//! `validation.rules[name]`. The first template (in listing order) that
//! defines a hint wins; remaining templates are not consulted.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::database::TemplateRepository;
use crate::error::ServiceResult;
use crate::models::Template;

/// How a candidate value was checked (or why it was not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMethod {
    AllowedValues,
    Enum,
    SingleValue,
    Pattern,
    Range,
    Unknown,
    NoTemplateConstraints,
}

impl ValidationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMethod::AllowedValues => "allowed_values",
            ValidationMethod::Enum => "enum",
            ValidationMethod::SingleValue => "single_value",
            ValidationMethod::Pattern => "pattern",
            ValidationMethod::Range => "range",
            ValidationMethod::Unknown => "unknown",
            ValidationMethod::NoTemplateConstraints => "no_template_constraints",
        }
    }
}

/// Error codes specific to template constraint failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateErrorCode {
    TemplateValueNotAllowed,
    TemplateValueFormatMismatch,
}

impl TemplateErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateErrorCode::TemplateValueNotAllowed => "template_value_not_allowed",
            TemplateErrorCode::TemplateValueFormatMismatch => "template_value_format_mismatch",
        }
    }
}

/// Outcome of checking one candidate value against a domain's templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValidationResult {
    pub is_valid: bool,
    pub error_code: Option<TemplateErrorCode>,
    pub error_message: Option<String>,
    pub allowed_values: Option<Vec<String>>,
    pub template_used: Option<String>,
    pub validation_method: ValidationMethod,
}

impl AttributeValidationResult {
    fn no_constraints() -> Self {
        Self {
            is_valid: true,
            error_code: None,
            error_message: None,
            allowed_values: None,
            template_used: None,
            validation_method: ValidationMethod::NoTemplateConstraints,
        }
    }

    fn pass(method: ValidationMethod, template: &str) -> Self {
        Self {
            is_valid: true,
            error_code: None,
            error_message: None,
            allowed_values: None,
            template_used: Some(template.to_string()),
            validation_method: method,
        }
    }

    fn fail(
        method: ValidationMethod,
        template: &str,
        code: TemplateErrorCode,
        message: String,
        allowed_values: Option<Vec<String>>,
    ) -> Self {
        Self {
            is_valid: false,
            error_code: Some(code),
            error_message: Some(message),
            allowed_values,
            template_used: Some(template.to_string()),
            validation_method: method,
        }
    }
}

/// Where active templates come from. Production uses the repository; tests
/// can supply a fixed list.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn active_templates(&self, domain_id: i64) -> anyhow::Result<Vec<Template>>;
}

#[async_trait]
impl TemplateSource for TemplateRepository {
    async fn active_templates(&self, domain_id: i64) -> anyhow::Result<Vec<Template>> {
        self.list_active_by_domain(domain_id).await
    }
}

/// The classified constraint hint found for an attribute.
#[derive(Debug, Clone, PartialEq)]
enum ConstraintKind {
    AllowedValues(Vec<String>),
    Enum(Vec<String>),
    SingleValue(String),
    Pattern(String),
    Range { min: Option<f64>, max: Option<f64> },
    Unknown,
}

pub struct TemplateConstraintValidator<S = TemplateRepository> {
    source: S,
}

impl<S: TemplateSource> TemplateConstraintValidator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Check `value` for `attribute_name` against the domain's active
    /// templates. With no template defining a hint for the attribute, any
    /// value passes (`no_template_constraints`).
    pub async fn validate(
        &self,
        domain_id: i64,
        attribute_name: &str,
        value: &str,
    ) -> ServiceResult<AttributeValidationResult> {
        let templates = self.source.active_templates(domain_id).await?;

        for template in &templates {
            let data = match template.data() {
                Ok(data) => data,
                Err(error) => {
                    // A template with unparseable data cannot constrain
                    // anything; it is skipped, not treated as a rejection.
                    warn!(template = %template.name, %error, "skipping template with invalid JSON");
                    continue;
                }
            };

            if let Some(hint) = find_hint(&data, attribute_name) {
                return Ok(check_constraint(
                    &classify(hint),
                    value,
                    &template.name,
                ));
            }
        }

        Ok(AttributeValidationResult::no_constraints())
    }
}

/// Fixed search order inside one template document.
fn find_hint<'a>(data: &'a serde_json::Value, name: &str) -> Option<&'a serde_json::Value> {
    if let Some(hint) = data.get("attributes").and_then(|a| a.get(name)) {
        return Some(hint);
    }
    if let Some(hint) = data
        .get("schema")
        .and_then(|s| s.get("properties"))
        .and_then(|p| p.get(name))
    {
        return Some(hint);
    }
    data.get("validation")
        .and_then(|v| v.get("rules"))
        .and_then(|r| r.get(name))
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_list(values: &[serde_json::Value]) -> Vec<String> {
    values.iter().filter_map(scalar_to_string).collect()
}

fn classify(hint: &serde_json::Value) -> ConstraintKind {
    match hint {
        serde_json::Value::Array(values) => ConstraintKind::AllowedValues(scalar_list(values)),
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::Array(values)) = map.get("enum") {
                return ConstraintKind::Enum(scalar_list(values));
            }
            if let Some(serde_json::Value::Array(values)) = map.get("allowed_values") {
                return ConstraintKind::AllowedValues(scalar_list(values));
            }
            if let Some(serde_json::Value::String(pattern)) = map.get("pattern") {
                return ConstraintKind::Pattern(pattern.clone());
            }
            let min = map.get("min").and_then(serde_json::Value::as_f64);
            let max = map.get("max").and_then(serde_json::Value::as_f64);
            if min.is_some() || max.is_some() {
                return ConstraintKind::Range { min, max };
            }
            ConstraintKind::Unknown
        }
        scalar => match scalar_to_string(scalar) {
            Some(expected) => ConstraintKind::SingleValue(expected),
            None => ConstraintKind::Unknown,
        },
    }
}

fn check_constraint(
    kind: &ConstraintKind,
    value: &str,
    template: &str,
) -> AttributeValidationResult {
    match kind {
        ConstraintKind::AllowedValues(allowed) | ConstraintKind::Enum(allowed) => {
            let method = if matches!(kind, ConstraintKind::Enum(_)) {
                ValidationMethod::Enum
            } else {
                ValidationMethod::AllowedValues
            };
            if allowed.iter().any(|candidate| candidate == value) {
                AttributeValidationResult::pass(method, template)
            } else {
                AttributeValidationResult::fail(
                    method,
                    template,
                    TemplateErrorCode::TemplateValueNotAllowed,
                    format!("value '{value}' is not in the template's allowed values"),
                    Some(allowed.clone()),
                )
            }
        }
        ConstraintKind::SingleValue(expected) => {
            if value == expected {
                AttributeValidationResult::pass(ValidationMethod::SingleValue, template)
            } else {
                AttributeValidationResult::fail(
                    ValidationMethod::SingleValue,
                    template,
                    TemplateErrorCode::TemplateValueNotAllowed,
                    format!("value '{value}' does not match the template's value '{expected}'"),
                    Some(vec![expected.clone()]),
                )
            }
        }
        ConstraintKind::Pattern(pattern) => match Regex::new(pattern) {
            Ok(regex) => {
                if regex.is_match(value) {
                    AttributeValidationResult::pass(ValidationMethod::Pattern, template)
                } else {
                    AttributeValidationResult::fail(
                        ValidationMethod::Pattern,
                        template,
                        TemplateErrorCode::TemplateValueFormatMismatch,
                        format!("value '{value}' does not match pattern '{pattern}'"),
                        None,
                    )
                }
            }
            Err(error) => {
                // A malformed pattern is a template authoring bug; it must
                // not reject legitimate values.
                warn!(template, %error, "unusable pattern constraint, accepting value");
                AttributeValidationResult::pass(ValidationMethod::Pattern, template)
            }
        },
        ConstraintKind::Range { min, max } => {
            let number: f64 = match value.parse() {
                Ok(number) => number,
                Err(_) => {
                    return AttributeValidationResult::fail(
                        ValidationMethod::Range,
                        template,
                        TemplateErrorCode::TemplateValueFormatMismatch,
                        format!("value '{value}' is not numeric"),
                        None,
                    )
                }
            };
            if let Some(min) = min {
                if number < *min {
                    return AttributeValidationResult::fail(
                        ValidationMethod::Range,
                        template,
                        TemplateErrorCode::TemplateValueNotAllowed,
                        format!("value {number} is below minimum {min}"),
                        None,
                    );
                }
            }
            if let Some(max) = max {
                if number > *max {
                    return AttributeValidationResult::fail(
                        ValidationMethod::Range,
                        template,
                        TemplateErrorCode::TemplateValueNotAllowed,
                        format!("value {number} is above maximum {max}"),
                        None,
                    );
                }
            }
            AttributeValidationResult::pass(ValidationMethod::Range, template)
        }
        ConstraintKind::Unknown => {
            warn!(template, "unrecognized constraint shape, accepting value");
            AttributeValidationResult::pass(ValidationMethod::Unknown, template)
        }
    }
}
