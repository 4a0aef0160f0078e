//! Integration tests for invoices.

use chrono::{Duration, Utc};
use fosterdesk_core::invoice::{compute_total, InvoiceLine};
use fosterdesk_db::models::invoice::{CreateInvoice, UpdateInvoice};
use fosterdesk_db::models::user::CreateUser;
use fosterdesk_db::repositories::{InvoiceRepo, UserRepo};
use sqlx::PgPool;

async fn admin(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: "finance".to_string(),
            email: "finance@example.org".to_string(),
            password_hash: "x".to_string(),
            role: "admin".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn new_invoice(number: &str, due_in: Duration) -> CreateInvoice {
    CreateInvoice {
        invoice_number: number.to_string(),
        freelancer_id: None,
        contact_id: None,
        lines: vec![InvoiceLine {
            description: "Training day".to_string(),
            quantity: 2,
            unit_price_pence: 15_000,
        }],
        issued_at: None,
        due_at: Some(Utc::now() + due_in),
        notes: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_stores_lines_and_total(pool: PgPool) {
    let user_id = admin(&pool).await;
    let input = new_invoice("INV-001", Duration::days(30));
    let total = compute_total(&input.lines).unwrap();

    let invoice = InvoiceRepo::create(&pool, user_id, &input, total).await.unwrap();

    assert_eq!(invoice.status, "draft");
    assert_eq!(invoice.total_pence, 30_000);
    assert_eq!(invoice.lines.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_change_requires_expected_source(pool: PgPool) {
    let user_id = admin(&pool).await;
    let input = new_invoice("INV-002", Duration::days(30));
    let invoice = InvoiceRepo::create(&pool, user_id, &input, 30_000).await.unwrap();

    let sent = InvoiceRepo::update_status(&pool, invoice.id, "draft", "sent")
        .await
        .unwrap()
        .expect("draft invoice should be sent");
    assert_eq!(sent.status, "sent");
    assert!(sent.issued_at.is_some());

    // A second writer still thinking it is a draft loses.
    let stale = InvoiceRepo::update_status(&pool, invoice.id, "draft", "void")
        .await
        .unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_only_applies_in_expected_status(pool: PgPool) {
    let user_id = admin(&pool).await;
    let invoice = InvoiceRepo::create(&pool, user_id, &new_invoice("INV-003", Duration::days(30)), 1)
        .await
        .unwrap();
    let edit = UpdateInvoice {
        invoice_number: None,
        freelancer_id: None,
        contact_id: None,
        lines: None,
        issued_at: None,
        due_at: None,
        notes: Some("Paid by BACS".to_string()),
    };

    let edited = InvoiceRepo::update(&pool, invoice.id, "draft", &edit, None)
        .await
        .unwrap()
        .expect("draft invoice is editable");
    assert_eq!(edited.notes.as_deref(), Some("Paid by BACS"));

    InvoiceRepo::update_status(&pool, invoice.id, "draft", "sent").await.unwrap();
    let late = InvoiceRepo::update(&pool, invoice.id, "draft", &edit, None).await.unwrap();
    assert!(late.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_mark_overdue_only_touches_sent_past_due(pool: PgPool) {
    let user_id = admin(&pool).await;

    let past = InvoiceRepo::create(&pool, user_id, &new_invoice("INV-010", -Duration::days(2)), 1)
        .await
        .unwrap();
    let future = InvoiceRepo::create(&pool, user_id, &new_invoice("INV-011", Duration::days(2)), 1)
        .await
        .unwrap();
    let draft = InvoiceRepo::create(&pool, user_id, &new_invoice("INV-012", -Duration::days(2)), 1)
        .await
        .unwrap();
    for id in [past.id, future.id] {
        InvoiceRepo::update_status(&pool, id, "draft", "sent").await.unwrap();
    }

    let changed = InvoiceRepo::mark_overdue(&pool, Utc::now()).await.unwrap();
    assert_eq!(changed, 1);

    let status = |id| {
        let pool = pool.clone();
        async move { InvoiceRepo::find_by_id(&pool, id).await.unwrap().unwrap().status }
    };
    assert_eq!(status(past.id).await, "overdue");
    assert_eq!(status(future.id).await, "sent");
    assert_eq!(status(draft.id).await, "draft");
}
