//! HTTP-level integration tests for contract templates and generated contracts.

mod common;

use axum::http::{header, StatusCode};
use common::{
    auth_token, body_json, body_text, delete_auth, get_auth, post_json_auth, put_json_auth,
};
use sqlx::PgPool;

const BODY: &str = "This agreement is between the charity and {{full_name}}.\n\
                    The day rate is {{day_rate}}.";

async fn create_template(pool: &PgPool, token: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "name": "Freelance agreement",
        "role_type": "freelancer",
        "content": BODY,
    });
    let response = post_json_auth(app, "/api/contract-templates", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_contract(
    pool: &PgPool,
    token: &str,
    template_id: i64,
    filled_data: serde_json::Value,
) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "template_id": template_id,
        "name": "Agreement for Alex",
        "filled_data": filled_data,
        "recipient_email": "alex@example.org",
    });
    let response = post_json_auth(app, "/api/contracts", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_template_lists_its_placeholders(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_template(&pool, &token).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/contract-templates/{id}/placeholders"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!(["full_name", "day_rate"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_role_type_is_rejected(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "name": "Odd", "role_type": "volunteer", "content": "" });
    let response = post_json_auth(app, "/api/contract-templates", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_preview_reports_missing_placeholders(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "content": "Hello {{full_name}}, starting {{start_date}}",
        "values": { "full_name": "Alex" },
    });
    let response = post_json_auth(app, "/api/contract-templates/preview", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["rendered"], "Hello Alex, starting [start_date]");
    assert_eq!(json["data"]["missing"], serde_json::json!(["start_date"]));
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_contract_cannot_be_sent_with_unfilled_fields(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let template_id = create_template(&pool, &token).await;
    let contract = create_contract(
        &pool,
        &token,
        template_id,
        serde_json::json!({ "full_name": "Alex Kay" }),
    )
    .await;
    assert_eq!(contract["status"], "draft");
    assert_eq!(contract["role_type"], "freelancer");
    assert_eq!(contract["missing_placeholders"], serde_json::json!(["day_rate"]));
    let id = contract["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/contracts/{id}/status"),
        serde_json::json!({ "status": "sent" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/contracts/{id}"),
        serde_json::json!({ "filled_data": { "full_name": "Alex Kay", "day_rate": "£250" } }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/contracts/{id}/status"),
        serde_json::json!({ "status": "sent" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "sent");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_document_download_renders_filled_data(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let template_id = create_template(&pool, &token).await;
    let contract = create_contract(
        &pool,
        &token,
        template_id,
        serde_json::json!({ "full_name": "Alex Kay" }),
    )
    .await;
    let id = contract["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/contracts/{id}/document"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment;"));

    let text = body_text(response).await;
    assert!(text.contains("between the charity and Alex Kay."));
    assert!(text.contains("The day rate is [day_rate]."));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_contract_without_template_cannot_be_sent(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let template_id = create_template(&pool, &token).await;
    let contract = create_contract(&pool, &token, template_id, serde_json::json!({})).await;
    let id = contract["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/contract-templates/{template_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/contracts/{id}"), &token).await;
    let json = body_json(response).await;
    assert!(json["data"]["template_id"].is_null());
    assert_eq!(json["data"]["missing_placeholders"], serde_json::json!([]));

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/contracts/{id}/status"),
        serde_json::json!({ "status": "sent" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/contracts/{id}/document"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Cancelling does not need the template.
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/contracts/{id}/status"),
        serde_json::json!({ "status": "cancelled" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "cancelled");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_status_jump_is_rejected(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let template_id = create_template(&pool, &token).await;
    let contract = create_contract(&pool, &token, template_id, serde_json::json!({})).await;
    let id = contract["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/contracts/{id}/status"),
        serde_json::json!({ "status": "completed" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deleted_contract_returns_404(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let template_id = create_template(&pool, &token).await;
    let contract = create_contract(&pool, &token, template_id, serde_json::json!({})).await;
    let id = contract["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/contracts/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/contracts/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
