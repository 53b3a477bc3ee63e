//! Data models shared across repositories and services

pub mod attribute;
pub mod domain;
pub mod node;
pub mod template;

pub use attribute::{
    Attribute, AttributeInput, CreateAttributeRequest, NewAttributeValue, NodeAttribute,
    NodeAttributeWithInfo, TemplateAttribute, TemplateAttributeWithInfo,
};
pub use domain::Domain;
pub use node::Node;
pub use template::Template;
