use ledger_engine::api::responses::{AccountResponse, EntryResponse, PageResponse, TransactionResponse};
use ledger_engine::error::AppError;
use ledger_engine::models::{Account, Cursor, Direction};
use ledger_engine::repositories::Page;
use uuid::Uuid;

#[test]
fn account_response_serializes_balance_as_string_not_number() {
    let mut account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "Cash".to_string(), "USD".to_string());
    account.balance_minor = -12345;

    let response: AccountResponse = account.into();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["balance_minor"], serde_json::json!("-12345"));
    assert!(json["balance_minor"].is_string());
}

#[test]
fn page_response_encodes_next_cursor_as_opaque_string() {
    let account = Account::new(Uuid::new_v4(), Uuid::new_v4(), "Cash".to_string(), "USD".to_string());
    let cursor = Cursor {
        created_at: account.created_at,
        id: account.id,
    };

    let page = Page {
        data: vec![account],
        next_cursor: Some(cursor),
    };

    let response: PageResponse<AccountResponse> = page.into();
    assert_eq!(response.data.len(), 1);
    let encoded = response.next_cursor.expect("cursor present");
    assert!(Cursor::decode(&encoded).is_ok());
}

#[test]
fn page_response_with_no_next_page_has_none_cursor() {
    let page: Page<Account> = Page {
        data: vec![],
        next_cursor: None,
    };
    let response: PageResponse<AccountResponse> = page.into();
    assert!(response.next_cursor.is_none());
}

#[test]
fn entry_response_preserves_direction_and_amount_as_string() {
    let entry = ledger_engine::models::Entry::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        Direction::Credit,
        750,
        "USD".to_string(),
    );
    let response: EntryResponse = entry.into();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["amount_minor"], serde_json::json!("750"));
    assert_eq!(json["direction"], serde_json::json!("CREDIT"));
}

#[test]
fn transaction_response_carries_reference_and_currency() {
    let tx = ledger_engine::models::Transaction::new(Uuid::new_v4(), Uuid::new_v4(), "ref-1".to_string(), "EUR".to_string());
    let response: TransactionResponse = tx.into();
    assert_eq!(response.reference, "ref-1");
    assert_eq!(response.currency, "EUR");
}

#[test]
fn error_body_never_leaks_a_repository_cause_message() {
    let error = AppError::repository(anyhow::anyhow!("connection reset by peer, host=10.0.0.5"));
    assert_eq!(error.code(), "REPOSITORY_ERROR");
    assert!(!error.public_message().contains("10.0.0.5"));
}

#[test]
fn invariant_violation_keeps_its_own_message_in_the_body() {
    let error = AppError::invariant("debits and credits must balance");
    assert_eq!(error.public_message(), "debits and credits must balance");
    assert_eq!(error.code(), "INVARIANT_VIOLATION");
}

#[test]
fn unauthorized_and_forbidden_map_to_distinct_status_codes() {
    let unauthorized = AppError::Unauthorized("missing credential".to_string());
    let forbidden = AppError::Forbidden("admin role required".to_string());
    assert_ne!(unauthorized.status_code(), forbidden.status_code());
}
