//! Template lifecycle management
//!
//! Templates carry a JSON payload and an active flag. Only the shape rules
//! the engine depends on are enforced here: a well-formed name, parseable
//! JSON, name uniqueness per domain, and the active/inactive transitions.

use tracing::info;

use crate::database::{DomainRepository, TemplateRepository};
use crate::error::{ServiceError, ServiceResult};
use crate::models::Template;

const MAX_NAME_LENGTH: usize = 255;

#[derive(Clone)]
pub struct TemplateService {
    domain_repo: DomainRepository,
    template_repo: TemplateRepository,
}

impl TemplateService {
    pub fn new(domain_repo: DomainRepository, template_repo: TemplateRepository) -> Self {
        Self {
            domain_repo,
            template_repo,
        }
    }

    pub async fn create_template(
        &self,
        domain_id: i64,
        name: &str,
        template_data: &str,
        title: &str,
        description: &str,
    ) -> ServiceResult<Template> {
        validate_template_name(name)?;
        if serde_json::from_str::<serde_json::Value>(template_data).is_err() {
            return Err(ServiceError::InvalidTemplate(
                "template data must be valid JSON".to_string(),
            ));
        }

        self.domain_repo
            .get_by_id(domain_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(domain_id))?;

        if self
            .template_repo
            .get_by_name(domain_id, name)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateTemplate {
                name: name.to_string(),
                domain_id,
            });
        }

        Ok(self
            .template_repo
            .create(domain_id, name, template_data, title, description)
            .await?)
    }

    pub async fn activate(&self, template_id: i64) -> ServiceResult<Template> {
        self.transition(template_id, true, "active").await
    }

    pub async fn deactivate(&self, template_id: i64) -> ServiceResult<Template> {
        self.transition(template_id, false, "inactive").await
    }

    async fn transition(
        &self,
        template_id: i64,
        target: bool,
        state: &'static str,
    ) -> ServiceResult<Template> {
        let template = self
            .template_repo
            .get_by_id(template_id)
            .await?
            .ok_or(ServiceError::TemplateNotFound(template_id))?;

        if template.is_active == target {
            return Err(ServiceError::TemplateAlreadyInState {
                name: template.name,
                state,
            });
        }

        let updated = self
            .template_repo
            .set_active(template_id, target)
            .await?
            .ok_or(ServiceError::TemplateNotFound(template_id))?;

        info!(template = %updated.name, state, "changed template state");
        Ok(updated)
    }
}

/// Template names: letters, digits, hyphens, underscores; no leading or
/// trailing separator.
fn validate_template_name(name: &str) -> ServiceResult<()> {
    if name.is_empty() {
        return Err(ServiceError::InvalidTemplate(
            "template name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ServiceError::InvalidTemplate(format!(
            "template name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ServiceError::InvalidTemplate(
            "template name can only contain letters, numbers, hyphens, and underscores"
                .to_string(),
        ));
    }
    if name.starts_with(['-', '_']) || name.ends_with(['-', '_']) {
        return Err(ServiceError::InvalidTemplate(
            "template name cannot start or end with hyphen or underscore".to_string(),
        ));
    }
    Ok(())
}
