//! Attribute schema management
//!
//! Declaring attributes is a domain-administrator action. A schema's type and
//! domain are fixed for life; only the description can change, so there is no
//! update path that could break values already stored under the schema.

use tracing::debug;

use crate::database::{AttributeRepository, DomainRepository};
use crate::error::{ErrorCode, ServiceError, ServiceResult};
use crate::models::{Attribute, CreateAttributeRequest};

const MAX_NAME_LENGTH: usize = 255;
const MAX_DESCRIPTION_LENGTH: usize = 1000;

#[derive(Clone)]
pub struct AttributeSchemaService {
    domain_repo: DomainRepository,
    attribute_repo: AttributeRepository,
}

impl AttributeSchemaService {
    pub fn new(domain_repo: DomainRepository, attribute_repo: AttributeRepository) -> Self {
        Self {
            domain_repo,
            attribute_repo,
        }
    }

    pub async fn create_attribute(
        &self,
        domain_id: i64,
        request: &CreateAttributeRequest,
    ) -> ServiceResult<Attribute> {
        validate_request(request)?;

        self.domain_repo
            .get_by_id(domain_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(domain_id))?;

        if self
            .attribute_repo
            .get_by_name(domain_id, &request.name)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateAttribute {
                name: request.name.clone(),
                domain_id,
            });
        }

        Ok(self.attribute_repo.create(domain_id, request).await?)
    }

    pub async fn get_attribute(&self, domain_id: i64, name: &str) -> ServiceResult<Attribute> {
        let domain = self
            .domain_repo
            .get_by_id(domain_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(domain_id))?;

        self.attribute_repo
            .get_by_name(domain_id, name)
            .await?
            .ok_or_else(|| ServiceError::AttributeNotDefined {
                name: name.to_string(),
                domain: domain.name,
            })
    }

    pub async fn list_attributes(&self, domain_id: i64) -> ServiceResult<Vec<Attribute>> {
        self.domain_repo
            .get_by_id(domain_id)
            .await?
            .ok_or(ServiceError::DomainNotFound(domain_id))?;
        Ok(self.attribute_repo.list_by_domain(domain_id).await?)
    }

    pub async fn update_description(
        &self,
        domain_id: i64,
        name: &str,
        description: &str,
    ) -> ServiceResult<Attribute> {
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(description_too_long(name));
        }

        let attribute = self.get_attribute(domain_id, name).await?;
        debug!(attribute = %name, domain_id, "updating attribute description");

        self.attribute_repo
            .update_description(attribute.id, description)
            .await?
            .ok_or_else(|| ServiceError::AttributeNotDefined {
                name: name.to_string(),
                domain: domain_id.to_string(),
            })
    }
}

fn validate_request(request: &CreateAttributeRequest) -> ServiceResult<()> {
    if request.name.is_empty() {
        return Err(ServiceError::Validation {
            attribute: request.name.clone(),
            code: ErrorCode::ValidationError,
            message: "attribute name cannot be empty".to_string(),
        });
    }
    if request.name.len() > MAX_NAME_LENGTH {
        return Err(ServiceError::Validation {
            attribute: request.name.clone(),
            code: ErrorCode::ValidationError,
            message: format!("attribute name cannot exceed {MAX_NAME_LENGTH} characters"),
        });
    }
    if request.description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(description_too_long(&request.name));
    }
    Ok(())
}

fn description_too_long(name: &str) -> ServiceError {
    ServiceError::Validation {
        attribute: name.to_string(),
        code: ErrorCode::ValidationError,
        message: format!("description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeType;
    use crate::database;

    async fn service() -> (AttributeSchemaService, i64) {
        let pool = database::connect_in_memory().await.unwrap();
        let domain_repo = DomainRepository::new(pool.clone());
        let domain = domain_repo.create("bookmarks", "").await.unwrap();
        (
            AttributeSchemaService::new(domain_repo, AttributeRepository::new(pool)),
            domain.id,
        )
    }

    fn request(name: &str) -> CreateAttributeRequest {
        CreateAttributeRequest {
            name: name.to_string(),
            attribute_type: AttributeType::Tag,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_in_domain_is_conflict() {
        let (service, domain_id) = service().await;

        service.create_attribute(domain_id, &request("category")).await.unwrap();
        let err = service
            .create_attribute(domain_id, &request("category"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Conflict));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let (service, domain_id) = service().await;
        let err = service
            .create_attribute(domain_id, &request(""))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ValidationError));
    }

    #[tokio::test]
    async fn test_unknown_domain_rejected() {
        let (service, _) = service().await;
        let err = service
            .create_attribute(9999, &request("category"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn test_description_update_only() {
        let (service, domain_id) = service().await;
        service.create_attribute(domain_id, &request("category")).await.unwrap();

        let updated = service
            .update_description(domain_id, "category", "primary topic")
            .await
            .unwrap();
        assert_eq!(updated.description, "primary topic");
        assert_eq!(updated.attribute_type, AttributeType::Tag);

        let err = service
            .update_description(domain_id, "missing", "x")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
    }
}
