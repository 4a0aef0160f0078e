//! HTTP-level integration tests for directory records, invoices, CSV export,
//! and the dashboard summary.

mod common;

use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use common::{auth_token, body_json, body_text, get_auth, post_json_auth};
use fosterdesk_db::repositories::InvoiceRepo;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_freelancers_as_csv(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "full_name": "Quinn Avery",
        "email": "quinn@example.org",
        "role": "delivery",
        "skills": ["first aid", "safeguarding"],
    });
    let response = post_json_auth(app, "/api/freelancers", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/export/freelancers", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,full_name,email"));
    let row = lines.next().unwrap();
    assert!(row.contains("Quinn Avery"));
    assert!(lines.next().is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_unknown_entity_is_rejected(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/export/passwords", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invoice_total_and_overdue_sweep(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "invoice_number": "INV-0001",
        "lines": [
            { "description": "Workshop delivery", "quantity": 2, "unit_price_pence": 25000 },
            { "description": "Travel", "quantity": 1, "unit_price_pence": 1250 },
        ],
        "due_at": (Utc::now() - Duration::days(1)).to_rfc3339(),
    });
    let response = post_json_auth(app, "/api/invoices", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total_pence"], 51250);
    assert_eq!(json["data"]["status"], "draft");
    let id = json["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/invoices/{id}/status"),
        serde_json::json!({ "status": "sent" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let flagged = InvoiceRepo::mark_overdue(&pool, Utc::now()).await.unwrap();
    assert_eq!(flagged, 1);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/dashboard/summary", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outstanding_invoice_pence"], 51250);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/invoices/{id}"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "overdue");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_empty_invoice_cannot_be_sent(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "invoice_number": "INV-0002" });
    let response = post_json_auth(app, "/api/invoices", body, &token).await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/invoices/{id}/status"),
        serde_json::json!({ "status": "sent" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
