//! Integration tests for templates and generated contracts.

use fosterdesk_db::models::contract::{CreateContract, UpdateContract};
use fosterdesk_db::models::contract_template::CreateContractTemplate;
use fosterdesk_db::models::user::CreateUser;
use fosterdesk_db::repositories::{ContractRepo, ContractTemplateRepo, UserRepo};
use sqlx::PgPool;

async fn setup(pool: &PgPool) -> (i64, i64) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "admin".to_string(),
            email: "admin@example.org".to_string(),
            password_hash: "x".to_string(),
            role: "admin".to_string(),
        },
    )
    .await
    .unwrap();
    let template = ContractTemplateRepo::create(
        pool,
        user.id,
        &CreateContractTemplate {
            name: "Freelancer agreement".to_string(),
            role_type: "freelancer".to_string(),
            content: "Dear {{name}}, your rate is {{rate}}.".to_string(),
        },
    )
    .await
    .unwrap();
    (user.id, template.id)
}

fn new_contract(template_id: i64) -> CreateContract {
    let mut filled = serde_json::Map::new();
    filled.insert("name".to_string(), serde_json::json!("Jane"));
    CreateContract {
        template_id,
        name: "Jane agreement".to_string(),
        filled_data: filled,
        recipient_email: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_sets_document_url(pool: PgPool) {
    let (user_id, template_id) = setup(&pool).await;
    let contract = ContractRepo::create(&pool, user_id, "freelancer", &new_contract(template_id))
        .await
        .unwrap();

    assert_eq!(contract.status, "draft");
    assert_eq!(
        contract.generated_doc_url.as_deref(),
        Some(format!("/api/contracts/{}/document", contract.id).as_str())
    );
    assert_eq!(contract.filled_data["name"], "Jane");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_removes_contract(pool: PgPool) {
    let (user_id, template_id) = setup(&pool).await;
    let contract = ContractRepo::create(&pool, user_id, "freelancer", &new_contract(template_id))
        .await
        .unwrap();

    assert!(ContractRepo::delete(&pool, contract.id).await.unwrap());
    assert!(ContractRepo::find_by_id(&pool, contract.id).await.unwrap().is_none());
    assert!(!ContractRepo::delete(&pool, contract.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_delete_detaches_contracts(pool: PgPool) {
    let (user_id, template_id) = setup(&pool).await;
    let contract = ContractRepo::create(&pool, user_id, "freelancer", &new_contract(template_id))
        .await
        .unwrap();

    assert!(ContractTemplateRepo::delete(&pool, template_id).await.unwrap());

    let kept = ContractRepo::find_by_id(&pool, contract.id)
        .await
        .unwrap()
        .expect("contract survives template deletion");
    assert_eq!(kept.template_id, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_versioned_update(pool: PgPool) {
    let (user_id, template_id) = setup(&pool).await;
    let contract = ContractRepo::create(&pool, user_id, "freelancer", &new_contract(template_id))
        .await
        .unwrap();

    let mut filled = serde_json::Map::new();
    filled.insert("rate".to_string(), serde_json::json!("£200"));
    let edit = UpdateContract {
        name: None,
        filled_data: Some(filled),
        recipient_email: None,
        expected_version: Some(contract.version),
    };

    let updated = ContractRepo::update(&pool, contract.id, "draft", &edit)
        .await
        .unwrap()
        .expect("current version applies");
    assert_eq!(updated.version, contract.version + 1);
    assert_eq!(updated.filled_data["rate"], "£200");
    assert!(updated.filled_data.get("name").is_none());

    let stale = ContractRepo::update(&pool, contract.id, "draft", &edit).await.unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_is_refused_once_status_moved_on(pool: PgPool) {
    let (user_id, template_id) = setup(&pool).await;
    let contract = ContractRepo::create(&pool, user_id, "freelancer", &new_contract(template_id))
        .await
        .unwrap();
    ContractRepo::update_status(&pool, contract.id, "cancelled", None)
        .await
        .unwrap()
        .unwrap();

    // Edit validated against the draft it read earlier.
    let edit = UpdateContract {
        name: Some("Renamed".to_string()),
        filled_data: None,
        recipient_email: None,
        expected_version: None,
    };
    let applied = ContractRepo::update(&pool, contract.id, "draft", &edit).await.unwrap();
    assert!(applied.is_none());

    let current = ContractRepo::find_by_id(&pool, contract.id).await.unwrap().unwrap();
    assert_eq!(current.status, "cancelled");
    assert_eq!(current.name, contract.name);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_change_stamps_sent_at(pool: PgPool) {
    let (user_id, template_id) = setup(&pool).await;
    let contract = ContractRepo::create(&pool, user_id, "freelancer", &new_contract(template_id))
        .await
        .unwrap();

    let sent = ContractRepo::update_status(&pool, contract.id, "sent", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sent.status, "sent");
    assert!(sent.sent_at.is_some());
    assert!(sent.signed_at.is_none());
}
