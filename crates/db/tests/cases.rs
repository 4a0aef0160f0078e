//! Integration tests for case persistence, transitions, and caseworker leads.

use chrono::Utc;
use fosterdesk_core::case_status::{plan_transition, CaseStatus};
use fosterdesk_core::caseworkers::Assignment;
use fosterdesk_db::models::case::{CreateCase, UpdateCase};
use fosterdesk_db::models::user::CreateUser;
use fosterdesk_db::repositories::{CaseRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            password_hash: "not-a-real-hash".to_string(),
            role: "caseworker".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_case(name: &str, assigned: Vec<Assignment>) -> CreateCase {
    CreateCase {
        case_reference_number: None,
        client_full_name: name.to_string(),
        summary: None,
        review_due_at: None,
        assigned_caseworkers: assigned,
    }
}

fn no_changes(expected_version: Option<i32>) -> UpdateCase {
    UpdateCase {
        case_reference_number: None,
        client_full_name: None,
        summary: Some("updated".to_string()),
        outcome_notes: None,
        review_due_at: None,
        expected_version,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_generates_reference_and_starts_new(pool: PgPool) {
    let author = make_user(&pool, "author").await;
    let case = CaseRepo::create(&pool, author, &new_case("Jane Smith", vec![]))
        .await
        .unwrap();

    assert_eq!(case.status, "New");
    assert!(case.case_reference_number.starts_with("CASE-"));
    assert_eq!(case.version, 1);
    assert!(case.opened_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_reference_is_unique_violation(pool: PgPool) {
    let author = make_user(&pool, "author").await;
    let mut input = new_case("A", vec![]);
    input.case_reference_number = Some("FC-1".to_string());
    CaseRepo::create(&pool, author, &input).await.unwrap();

    let err = CaseRepo::create(&pool, author, &input).await.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_cases_reference_number"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transition_to_open_sets_opened(pool: PgPool) {
    let author = make_user(&pool, "author").await;
    let case = CaseRepo::create(&pool, author, &new_case("Jane", vec![]))
        .await
        .unwrap();

    let plan = plan_transition(
        CaseStatus::New,
        CaseStatus::Open,
        case.key_dates(),
        None,
        Utc::now(),
    )
    .unwrap();
    let updated = CaseRepo::apply_transition(&pool, case.id, &plan, None, None)
        .await
        .unwrap()
        .expect("case should transition");

    assert_eq!(updated.status, "Open");
    assert!(updated.opened_at.is_some());
    assert_eq!(updated.version, 2);

    // Replaying the same plan finds the case no longer in `New`.
    let replay = CaseRepo::apply_transition(&pool, case.id, &plan, None, None)
        .await
        .unwrap();
    assert!(replay.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_version_update_is_rejected(pool: PgPool) {
    let author = make_user(&pool, "author").await;
    let case = CaseRepo::create(&pool, author, &new_case("Jane", vec![]))
        .await
        .unwrap();

    let first = CaseRepo::update(&pool, case.id, &no_changes(Some(1)))
        .await
        .unwrap();
    assert_eq!(first.unwrap().version, 2);

    let stale = CaseRepo::update(&pool, case.id, &no_changes(Some(1)))
        .await
        .unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_set_lead_leaves_exactly_one_lead(pool: PgPool) {
    let a = make_user(&pool, "alice").await;
    let b = make_user(&pool, "bob").await;
    let case = CaseRepo::create(
        &pool,
        a,
        &new_case(
            "Jane",
            vec![
                Assignment { user_id: a, is_lead: true },
                Assignment { user_id: b, is_lead: false },
            ],
        ),
    )
    .await
    .unwrap();

    assert!(CaseRepo::set_lead(&pool, case.id, b).await.unwrap());

    let workers = CaseRepo::list_caseworkers(&pool, case.id).await.unwrap();
    let leads: Vec<i64> = workers.iter().filter(|w| w.is_lead).map(|w| w.user_id).collect();
    assert_eq!(leads, vec![b]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_set_lead_for_unassigned_user_changes_nothing(pool: PgPool) {
    let a = make_user(&pool, "alice").await;
    let outsider = make_user(&pool, "outsider").await;
    let case = CaseRepo::create(
        &pool,
        a,
        &new_case("Jane", vec![Assignment { user_id: a, is_lead: true }]),
    )
    .await
    .unwrap();

    assert!(!CaseRepo::set_lead(&pool, case.id, outsider).await.unwrap());

    let workers = CaseRepo::list_caseworkers(&pool, case.id).await.unwrap();
    assert_eq!(workers.len(), 1);
    assert!(workers[0].is_lead);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_two_leads_violate_partial_index(pool: PgPool) {
    let a = make_user(&pool, "alice").await;
    let b = make_user(&pool, "bob").await;
    let case = CaseRepo::create(&pool, a, &new_case("Jane", vec![]))
        .await
        .unwrap();

    let err = CaseRepo::set_caseworkers(
        &pool,
        case.id,
        &[
            Assignment { user_id: a, is_lead: true },
            Assignment { user_id: b, is_lead: true },
        ],
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_case_caseworkers_lead"));

    // The failed replacement rolled back.
    assert!(CaseRepo::list_caseworkers(&pool, case.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_caseworker(pool: PgPool) {
    let a = make_user(&pool, "alice").await;
    let b = make_user(&pool, "bob").await;
    CaseRepo::create(
        &pool,
        a,
        &new_case("Mine", vec![Assignment { user_id: a, is_lead: false }]),
    )
    .await
    .unwrap();
    CaseRepo::create(
        &pool,
        a,
        &new_case("Theirs", vec![Assignment { user_id: b, is_lead: false }]),
    )
    .await
    .unwrap();

    let mine = CaseRepo::list_filtered(&pool, None, Some(a), None, 50, 0)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].client_full_name, "Mine");
}
