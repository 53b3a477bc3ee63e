//! Business services over the repositories
//!
//! The binder owns the only write path for attribute values; the template
//! constraint validator is a separate layer callers invoke when they want
//! template-aware checking on top of the type validators.

pub mod attribute_binder;
pub mod attribute_schemas;
pub mod template_constraints;
pub mod templates;

pub use attribute_binder::AttributeValueBinder;
pub use attribute_schemas::AttributeSchemaService;
pub use template_constraints::{
    AttributeValidationResult, TemplateConstraintValidator, TemplateErrorCode, TemplateSource,
    ValidationMethod,
};
pub use templates::TemplateService;
