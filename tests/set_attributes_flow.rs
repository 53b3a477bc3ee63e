//! End-to-end flow: declare schemas, bind node and template attributes,
//! then layer template constraints over the same domain.

use std::sync::Arc;

use url_db::attributes::{AttributeType, ValidatorRegistry};
use url_db::database::{
    self, AttributeRepository, DomainRepository, NodeAttributeRepository, NodeRepository,
    TemplateAttributeRepository, TemplateRepository,
};
use url_db::error::ErrorCode;
use url_db::models::{AttributeInput, CreateAttributeRequest};
use url_db::services::{
    AttributeSchemaService, AttributeValueBinder, TemplateConstraintValidator, TemplateService,
};

struct App {
    schemas: AttributeSchemaService,
    templates: TemplateService,
    binder: AttributeValueBinder,
    constraints: TemplateConstraintValidator,
    domain_id: i64,
    node_id: i64,
}

async fn app() -> App {
    let pool = database::connect_in_memory().await.unwrap();
    let domain_repo = DomainRepository::new(pool.clone());
    let node_repo = NodeRepository::new(pool.clone());
    let template_repo = TemplateRepository::new(pool.clone());
    let attribute_repo = AttributeRepository::new(pool.clone());

    let domain = domain_repo.create("bookmarks", "personal links").await.unwrap();
    let node = node_repo
        .create(domain.id, "https://doc.rust-lang.org", "The Rust docs", "")
        .await
        .unwrap();

    let binder = AttributeValueBinder::new(
        Arc::new(ValidatorRegistry::new()),
        domain_repo.clone(),
        node_repo,
        template_repo.clone(),
        attribute_repo.clone(),
        NodeAttributeRepository::new(pool.clone()),
        TemplateAttributeRepository::new(pool),
    );

    App {
        schemas: AttributeSchemaService::new(domain_repo.clone(), attribute_repo),
        templates: TemplateService::new(domain_repo, template_repo.clone()),
        binder,
        constraints: TemplateConstraintValidator::new(template_repo),
        domain_id: domain.id,
        node_id: node.id,
    }
}

fn request(name: &str, attribute_type: AttributeType) -> CreateAttributeRequest {
    CreateAttributeRequest {
        name: name.to_string(),
        attribute_type,
        description: String::new(),
    }
}

fn input(name: &str, value: &str, order_index: Option<i64>) -> AttributeInput {
    AttributeInput {
        name: name.to_string(),
        value: value.to_string(),
        order_index,
    }
}

#[tokio::test]
async fn full_node_attribute_lifecycle() {
    let app = app().await;

    app.schemas
        .create_attribute(app.domain_id, &request("category", AttributeType::Tag))
        .await
        .unwrap();
    app.schemas
        .create_attribute(app.domain_id, &request("chapters", AttributeType::OrderedTag))
        .await
        .unwrap();
    app.schemas
        .create_attribute(app.domain_id, &request("rating", AttributeType::Number))
        .await
        .unwrap();
    app.schemas
        .create_attribute(app.domain_id, &request("summary", AttributeType::Markdown))
        .await
        .unwrap();
    app.schemas
        .create_attribute(app.domain_id, &request("cover", AttributeType::Image))
        .await
        .unwrap();

    app.binder
        .set_node_attributes(
            app.node_id,
            &[
                input("category", "Rust", None),
                input("category", "reference", None),
                input("chapters", "Ownership", Some(0)),
                input("chapters", "Lifetimes", Some(1)),
                input("rating", "4.5", None),
                input("summary", "The [official](https://rust-lang.org) guide.", None),
                input("cover", "https://rust-lang.org/logo.png", None),
            ],
        )
        .await
        .unwrap();

    let stored = app.binder.list_node_attributes(app.node_id).await.unwrap();
    assert_eq!(stored.len(), 7);
    assert!(stored
        .iter()
        .any(|v| v.name == "category" && v.value == "rust"));

    // Replace-all: the new set fully supersedes the old one.
    app.binder
        .set_node_attributes(app.node_id, &[input("rating", "5", None)])
        .await
        .unwrap();
    let stored = app.binder.list_node_attributes(app.node_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].value, "5");

    // Reads by attribute value use the normalized form.
    app.binder
        .set_node_attributes(app.node_id, &[input("category", "RUST", None)])
        .await
        .unwrap();
    let found = app
        .binder
        .find_nodes(app.domain_id, "category", Some("rust"))
        .await
        .unwrap();
    assert_eq!(found, vec![app.node_id]);
}

#[tokio::test]
async fn failed_batch_leaves_store_untouched() {
    let app = app().await;
    app.schemas
        .create_attribute(app.domain_id, &request("category", AttributeType::Tag))
        .await
        .unwrap();
    app.schemas
        .create_attribute(app.domain_id, &request("rating", AttributeType::Number))
        .await
        .unwrap();

    app.binder
        .set_node_attributes(app.node_id, &[input("category", "keep-me", None)])
        .await
        .unwrap();

    // Tuple 3 of 5 is invalid; nothing from this batch may land.
    let err = app
        .binder
        .set_node_attributes(
            app.node_id,
            &[
                input("category", "one", None),
                input("category", "two", None),
                input("rating", "NaN-ish", None),
                input("category", "four", None),
                input("category", "five", None),
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::ValidationError));
    assert!(err.to_string().contains("rating"));

    let stored = app.binder.list_node_attributes(app.node_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].value, "keep-me");
}

#[tokio::test]
async fn template_constraints_layer_over_type_validation() {
    let app = app().await;
    app.schemas
        .create_attribute(app.domain_id, &request("status", AttributeType::String))
        .await
        .unwrap();

    // No templates yet: everything passes trivially.
    let open = app
        .constraints
        .validate(app.domain_id, "status", "whatever")
        .await
        .unwrap();
    assert!(open.is_valid);
    assert_eq!(open.validation_method.as_str(), "no_template_constraints");

    let workflow = app
        .templates
        .create_template(
            app.domain_id,
            "workflow",
            r#"{"attributes":{"status":{"enum":["draft","published"]}}}"#,
            "Workflow",
            "",
        )
        .await
        .unwrap();

    let allowed = app
        .constraints
        .validate(app.domain_id, "status", "draft")
        .await
        .unwrap();
    assert!(allowed.is_valid);
    assert_eq!(allowed.template_used.as_deref(), Some("workflow"));

    let rejected = app
        .constraints
        .validate(app.domain_id, "status", "archived")
        .await
        .unwrap();
    assert!(!rejected.is_valid);
    assert_eq!(
        rejected.allowed_values,
        Some(vec!["draft".to_string(), "published".to_string()])
    );

    // Deactivated templates stop constraining.
    let deactivated = app.templates.deactivate(workflow.id).await.unwrap();
    assert!(!deactivated.is_active);

    let open_again = app
        .constraints
        .validate(app.domain_id, "status", "archived")
        .await
        .unwrap();
    assert!(open_again.is_valid);
    assert_eq!(
        open_again.validation_method.as_str(),
        "no_template_constraints"
    );
}

#[tokio::test]
async fn inactive_template_owner_is_read_only() {
    let app = app().await;
    app.schemas
        .create_attribute(app.domain_id, &request("topic", AttributeType::Tag))
        .await
        .unwrap();

    let template = app
        .templates
        .create_template(app.domain_id, "reading-list", "{}", "", "")
        .await
        .unwrap();

    app.binder
        .set_template_attributes(template.id, &[input("topic", "rust", None)])
        .await
        .unwrap();

    app.templates.deactivate(template.id).await.unwrap();
    let err = app
        .binder
        .set_template_attributes(template.id, &[input("topic", "go", None)])
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TemplateInactive));
}
