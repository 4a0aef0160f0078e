//! HTTP-level integration tests for training events and participant import.

mod common;

use axum::http::StatusCode;
use common::{
    auth_token, body_json, get_auth, post_csv_auth, post_json_auth, post_multipart_csv_auth,
    put_json_auth,
};
use sqlx::PgPool;

async fn create_event(pool: &PgPool, token: &str, capacity: Option<i32>) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "title": "Safer caring workshop",
        "starts_at": "2030-05-01T09:30:00Z",
        "ends_at": "2030-05-01T16:00:00Z",
        "location": "Community hall",
        "capacity": capacity,
    });
    let response = post_json_auth(app, "/api/training/events", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_event_ending_before_start_is_rejected(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "title": "Backwards",
        "starts_at": "2030-05-01T16:00:00Z",
        "ends_at": "2030-05-01T09:00:00Z",
    });
    let response = post_json_auth(app, "/api/training/events", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_csv_import_reports_every_row(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_event(&pool, &token, None).await;

    let csv = "full_name,email,attended\n\
               Ada Lovell,ada@example.org,yes\n\
               Ben Ortiz,not-an-email,no\n\
               \"Chen, Li\",chen@example.org,\n\
               Dup Ada,ADA@example.org,no\n";

    let app = common::build_test_app(pool.clone());
    let response = post_csv_auth(
        app,
        &format!("/api/training/events/{id}/participants/import"),
        csv,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["summary"]["total"], 4);
    assert_eq!(json["data"]["summary"]["succeeded"], 2);
    assert_eq!(json["data"]["summary"]["failed"], 2);

    let results = json["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results[0]["row"], 2);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[2]["success"], true);
    assert_eq!(results[3]["success"], false);
    assert!(results[3]["error"]
        .as_str()
        .unwrap()
        .contains("already registered"));

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/training/events/{id}"), &token).await;
    let json = body_json(response).await;
    let participants = json["data"]["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
    assert!(participants
        .iter()
        .any(|p| p["full_name"] == "Chen, Li" && p["attended"] == false));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_multipart_import_respects_capacity(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_event(&pool, &token, Some(2)).await;

    let csv = "name,email\nOne,one@example.org\nTwo,two@example.org\nThree,three@example.org\n";

    let app = common::build_test_app(pool);
    let response = post_multipart_csv_auth(
        app,
        &format!("/api/training/events/{id}/participants/import"),
        csv,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["summary"]["succeeded"], 2);
    let results = json["data"]["results"].as_array().unwrap();
    assert_eq!(results[2]["success"], false);
    assert_eq!(results[2]["error"], "Event is at capacity");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_import_without_email_column_is_rejected(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_event(&pool, &token, None).await;

    let app = common::build_test_app(pool);
    let response = post_csv_auth(
        app,
        &format!("/api/training/events/{id}/participants/import"),
        "full_name\nAda Lovell\n",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_capacity_cannot_drop_below_registrations(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_event(&pool, &token, Some(5)).await;

    for (name, email) in [("Ada", "ada@example.org"), ("Ben", "ben@example.org")] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            &format!("/api/training/events/{id}/participants"),
            serde_json::json!({ "full_name": name, "email": email }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/training/events/{id}"),
        serde_json::json!({ "capacity": 1 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
