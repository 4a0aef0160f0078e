//! HTTP-level integration tests for the enquiry pipeline: assessments,
//! follow-up reminders, stage advancement, and closure.

mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use common::{auth_token, body_json, get_auth, post_json_auth};
use sqlx::PgPool;

async fn create_enquiry(pool: &PgPool, token: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "applicant_name": "Jamie Rivers",
        "email": "jamie@example.org",
        "source": "website",
    });
    let response = post_json_auth(app, "/api/enquiries", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["stage"], "Inquiry");
    assert_eq!(json["data"]["status"], "open");
    json["data"]["id"].as_i64().unwrap()
}

async fn submit(
    pool: &PgPool,
    token: &str,
    id: i64,
    kind: &str,
    result: &str,
) -> axum::http::Response<axum::body::Body> {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/enquiries/{id}/{kind}-assessment"),
        serde_json::json!({ "result": result, "assessor": "M. Okafor" }),
        token,
    )
    .await
}

fn parse_ts(value: &serde_json::Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

// ---------------------------------------------------------------------------
// Assessments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_initial_pass_creates_seven_day_reminder(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;

    let before = Utc::now();
    let response = submit(&pool, &token, id, "initial", "Pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["enquiry"]["stage"], "Assessment");
    assert_eq!(json["data"]["enquiry"]["initial_assessment"]["result"], "Pass");

    let reminder = &json["data"]["reminder"];
    assert_eq!(reminder["title"], "Conduct Full Assessment");
    assert_eq!(reminder["status"], "pending");
    assert_eq!(reminder["related_entity_type"], "enquiry");
    assert_eq!(reminder["related_entity_id"], id);
    let due = parse_ts(&reminder["due_at"]);
    assert!(due >= before + Duration::days(7) - Duration::seconds(1));
    assert!(due <= Utc::now() + Duration::days(7) + Duration::seconds(1));

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/reminders?related_entity_type=enquiry&related_entity_id={id}"),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_failed_assessment_declines_enquiry(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;

    let response = submit(&pool, &token, id, "initial", "Fail").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["enquiry"]["status"], "declined");
    assert_eq!(json["data"]["enquiry"]["stage"], "Inquiry");
    assert_eq!(json["data"]["reminder"]["title"], "Send Decline Email");

    let response = submit(&pool, &token, id, "initial", "Pass").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_full_assessment_needs_initial_pass(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;

    let response = submit(&pool, &token, id, "full", "Pass").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = submit(&pool, &token, id, "initial", "Pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = submit(&pool, &token, id, "full", "Pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["enquiry"]["stage"], "Mentoring");
    assert_eq!(json["data"]["reminder"]["title"], "Assign Mentor");
}

// ---------------------------------------------------------------------------
// Stage and closure
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_advance_moves_one_stage(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/enquiries/{id}/advance"),
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["stage"], "Application");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_advance_into_assessment_needs_initial_pass(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;
    let uri = format!("/api/enquiries/{id}/advance");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Still at Application, so the initial assessment moves it on.
    let response = submit(&pool, &token, id, "initial", "Pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["enquiry"]["stage"], "Assessment");

    let response = submit(&pool, &token, id, "full", "Pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, &uri, serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["stage"], "Final Approval");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_approval_before_final_stage_is_rejected(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/enquiries/{id}/closure"),
        serde_json::json!({ "outcome": "approved" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_withdrawn_enquiry_cannot_be_closed_twice(pool: PgPool) {
    let token = auth_token(&pool, "worker", "caseworker").await;
    let id = create_enquiry(&pool, &token).await;
    let uri = format!("/api/enquiries/{id}/closure");
    let body = serde_json::json!({ "outcome": "withdrawn", "reason": "Moved away" });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, &uri, body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "withdrawn");
    assert_eq!(json["data"]["case_closure"]["outcome"], "withdrawn");

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
