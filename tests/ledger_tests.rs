mod common;

use std::sync::Arc;

use ledger_engine::error::AppError;
use ledger_engine::models::Direction;
use ledger_engine::repositories::PostgresRepository;
use ledger_engine::services::{LedgerService, PostTransactionRequest, PostingLine, PostingService, ReadService};
use uuid::Uuid;

async fn setup() -> (LedgerService, PostingService, ReadService, Uuid) {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let repo = Arc::new(PostgresRepository::new(pool.clone()));

    let tenant_id: (Uuid,) = sqlx::query_as("INSERT INTO tenants (id, name) VALUES ($1, $2) RETURNING id")
        .bind(Uuid::new_v4())
        .bind("Acme")
        .fetch_one(&pool)
        .await
        .expect("insert tenant");

    (
        LedgerService::new(repo.clone(), repo.clone()),
        PostingService::new(repo.clone()),
        ReadService::new(repo),
        tenant_id.0,
    )
}

#[tokio::test]
async fn creates_ledger_and_accounts_then_lists_them() {
    let (ledger_service, _posting, read_service, tenant_id) = setup().await;

    let ledger = ledger_service.create_ledger(tenant_id, "main").await.unwrap();
    let cash = ledger_service.create_account(tenant_id, ledger.id, "Cash", "usd").await.unwrap();
    assert_eq!(cash.currency, "USD");

    let ledgers = ledger_service.get_ledgers_by_tenant(tenant_id).await.unwrap();
    assert_eq!(ledgers.len(), 1);

    let page = read_service.list_accounts(tenant_id, None, None).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn posts_balanced_transaction_and_reflects_in_trial_balance() {
    let (ledger_service, posting_service, read_service, tenant_id) = setup().await;

    let ledger = ledger_service.create_ledger(tenant_id, "main").await.unwrap();
    let cash = ledger_service.create_account(tenant_id, ledger.id, "Cash", "USD").await.unwrap();
    let revenue = ledger_service.create_account(tenant_id, ledger.id, "Revenue", "USD").await.unwrap();

    let outcome = posting_service
        .post_transaction(PostTransactionRequest {
            tenant_id,
            ledger_id: ledger.id,
            reference: "invoice-1".to_string(),
            currency: "USD".to_string(),
            entries: vec![
                PostingLine {
                    account_id: cash.id,
                    direction: Direction::Debit,
                    amount_minor: 500,
                    currency: "USD".to_string(),
                },
                PostingLine {
                    account_id: revenue.id,
                    direction: Direction::Credit,
                    amount_minor: 500,
                    currency: "USD".to_string(),
                },
            ],
        })
        .await
        .unwrap();
    assert!(outcome.created);

    let tb = read_service.trial_balance(tenant_id, ledger.id).await.unwrap();
    assert_eq!(tb.total_debits_minor, tb.total_credits_minor);
    assert_eq!(tb.total_debits_minor, 500);

    let transactions = read_service.list_transactions(tenant_id, None, None).await.unwrap();
    assert_eq!(transactions.data.len(), 1);
    assert_eq!(transactions.data[0].reference, "invoice-1");

    let entries = read_service.list_entries(tenant_id, None, None).await.unwrap();
    assert_eq!(entries.data.len(), 2);
}

#[tokio::test]
async fn repeated_reference_does_not_duplicate_transaction() {
    let (ledger_service, posting_service, read_service, tenant_id) = setup().await;

    let ledger = ledger_service.create_ledger(tenant_id, "main").await.unwrap();
    let cash = ledger_service.create_account(tenant_id, ledger.id, "Cash", "USD").await.unwrap();
    let revenue = ledger_service.create_account(tenant_id, ledger.id, "Revenue", "USD").await.unwrap();

    let request = || PostTransactionRequest {
        tenant_id,
        ledger_id: ledger.id,
        reference: "dup-ref".to_string(),
        currency: "USD".to_string(),
        entries: vec![
            PostingLine {
                account_id: cash.id,
                direction: Direction::Debit,
                amount_minor: 10,
                currency: "USD".to_string(),
            },
            PostingLine {
                account_id: revenue.id,
                direction: Direction::Credit,
                amount_minor: 10,
                currency: "USD".to_string(),
            },
        ],
    };

    posting_service.post_transaction(request()).await.unwrap();
    posting_service.post_transaction(request()).await.unwrap();
    posting_service.post_transaction(request()).await.unwrap();

    let transactions = read_service.list_transactions(tenant_id, None, None).await.unwrap();
    assert_eq!(transactions.data.len(), 1);
}

#[tokio::test]
async fn unbalanced_posting_is_rejected_before_touching_repository() {
    let (ledger_service, posting_service, read_service, tenant_id) = setup().await;

    let ledger = ledger_service.create_ledger(tenant_id, "main").await.unwrap();
    let cash = ledger_service.create_account(tenant_id, ledger.id, "Cash", "USD").await.unwrap();
    let revenue = ledger_service.create_account(tenant_id, ledger.id, "Revenue", "USD").await.unwrap();

    let result = posting_service
        .post_transaction(PostTransactionRequest {
            tenant_id,
            ledger_id: ledger.id,
            reference: "bad".to_string(),
            currency: "USD".to_string(),
            entries: vec![
                PostingLine {
                    account_id: cash.id,
                    direction: Direction::Debit,
                    amount_minor: 100,
                    currency: "USD".to_string(),
                },
                PostingLine {
                    account_id: revenue.id,
                    direction: Direction::Credit,
                    amount_minor: 99,
                    currency: "USD".to_string(),
                },
            ],
        })
        .await;

    assert!(matches!(result, Err(AppError::InvariantViolation(_))));

    let transactions = read_service.list_transactions(tenant_id, None, None).await.unwrap();
    assert!(transactions.data.is_empty());
}

/// spec.md §8 testable property 6 / scenario S5: a `limit`-bounded listing
/// returns a `next_cursor` at the page boundary, and refetching with that
/// cursor picks up exactly where the first page left off.
#[tokio::test]
async fn account_listing_paginates_across_a_page_boundary() {
    let (ledger_service, _posting, read_service, tenant_id) = setup().await;

    let ledger = ledger_service.create_ledger(tenant_id, "main").await.unwrap();
    let first = ledger_service.create_account(tenant_id, ledger.id, "Account A", "USD").await.unwrap();
    let second = ledger_service.create_account(tenant_id, ledger.id, "Account B", "USD").await.unwrap();
    let third = ledger_service.create_account(tenant_id, ledger.id, "Account C", "USD").await.unwrap();

    let page_one = read_service.list_accounts(tenant_id, Some(2), None).await.unwrap();
    assert_eq!(page_one.data.len(), 2);
    assert_eq!(page_one.data[0].id, first.id);
    assert_eq!(page_one.data[1].id, second.id);
    let next_cursor = page_one.next_cursor.expect("first page must carry a next_cursor");

    let page_two = read_service
        .list_accounts(tenant_id, Some(2), Some(&next_cursor.encode()))
        .await
        .unwrap();
    assert_eq!(page_two.data.len(), 1);
    assert_eq!(page_two.data[0].id, third.id);
    assert!(page_two.next_cursor.is_none());
}

#[tokio::test]
async fn tenant_cannot_see_another_tenants_ledger() {
    let (ledger_service, _posting, _read, tenant_id) = setup().await;
    let ledger = ledger_service.create_ledger(tenant_id, "main").await.unwrap();

    let other_tenant = Uuid::new_v4();
    let result = ledger_service.get_ledger_by_id(other_tenant, ledger.id).await;
    assert!(matches!(result, Err(AppError::LedgerNotFound(_))));
}
