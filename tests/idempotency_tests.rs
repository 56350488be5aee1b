mod common;

use ledger_engine::models::Direction;
use ledger_engine::repositories::{EntryInput, LedgerReadRepository, LedgerRepository, PostTransactionInput, PostgresRepository};
use uuid::Uuid;

/// Focused coverage of property 2 (spec.md §8): N `PostTransaction` calls with
/// the same `(tenant_id, reference)` must persist exactly one transaction.
#[tokio::test]
async fn same_reference_posted_many_times_persists_once() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let repo = PostgresRepository::new(pool.clone());

    let tenant: (Uuid,) = sqlx::query_as("INSERT INTO tenants (id, name) VALUES ($1, $2) RETURNING id")
        .bind(Uuid::new_v4())
        .bind("Acme")
        .fetch_one(&pool)
        .await
        .unwrap();
    let tenant_id = tenant.0;

    let ledger = repo.create_ledger(tenant_id, "main").await.unwrap();
    let cash = repo.create_account(tenant_id, ledger.id, "Cash", "USD").await.unwrap();
    let revenue = repo.create_account(tenant_id, ledger.id, "Revenue", "USD").await.unwrap();

    let input = || PostTransactionInput {
        tenant_id,
        ledger_id: ledger.id,
        reference: "same-ref".to_string(),
        currency: "USD".to_string(),
        entries: vec![
            EntryInput {
                account_id: cash.id,
                direction: Direction::Debit,
                amount_minor: 42,
                currency: "USD".to_string(),
            },
            EntryInput {
                account_id: revenue.id,
                direction: Direction::Credit,
                amount_minor: 42,
                currency: "USD".to_string(),
            },
        ],
    };

    let mut transaction_ids = Vec::new();
    for i in 0..10 {
        let outcome = repo.post_transaction(input()).await.expect("post should succeed");
        transaction_ids.push(outcome.transaction_id);
        assert_eq!(outcome.created, i == 0, "only the first call should create a new transaction");
    }

    assert!(transaction_ids.iter().all(|id| *id == transaction_ids[0]));

    let page = repo.list_transactions(tenant_id, 50, None).await.unwrap();
    assert_eq!(page.data.len(), 1);

    let accounts = repo.list_accounts(tenant_id, 50, None).await.unwrap();
    let cash_row = accounts.data.iter().find(|a| a.id == cash.id).unwrap();
    assert_eq!(cash_row.balance_minor, -42, "balance must reflect a single application, not ten");
}

#[tokio::test]
async fn different_references_create_distinct_transactions() {
    let pool = common::setup_test_db().await;
    common::cleanup_test_data(&pool).await;
    let repo = PostgresRepository::new(pool.clone());

    let tenant: (Uuid,) = sqlx::query_as("INSERT INTO tenants (id, name) VALUES ($1, $2) RETURNING id")
        .bind(Uuid::new_v4())
        .bind("Acme")
        .fetch_one(&pool)
        .await
        .unwrap();
    let tenant_id = tenant.0;

    let ledger = repo.create_ledger(tenant_id, "main").await.unwrap();
    let cash = repo.create_account(tenant_id, ledger.id, "Cash", "USD").await.unwrap();
    let revenue = repo.create_account(tenant_id, ledger.id, "Revenue", "USD").await.unwrap();

    for reference in ["ref-a", "ref-b", "ref-c"] {
        let outcome = repo
            .post_transaction(PostTransactionInput {
                tenant_id,
                ledger_id: ledger.id,
                reference: reference.to_string(),
                currency: "USD".to_string(),
                entries: vec![
                    EntryInput {
                        account_id: cash.id,
                        direction: Direction::Debit,
                        amount_minor: 10,
                        currency: "USD".to_string(),
                    },
                    EntryInput {
                        account_id: revenue.id,
                        direction: Direction::Credit,
                        amount_minor: 10,
                        currency: "USD".to_string(),
                    },
                ],
            })
            .await
            .unwrap();
        assert!(outcome.created);
    }

    let page = repo.list_transactions(tenant_id, 50, None).await.unwrap();
    assert_eq!(page.data.len(), 3);
}
