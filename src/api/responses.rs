use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, ApiKey, Direction, Entry, Ledger, NormalBalance, Role, Transaction};
use crate::repositories::{Page, TrialBalance};

/// Error body shape for every non-2xx response (spec.md §6): `{error, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.code(),
            message: self.public_message(),
        };
        if let AppError::RepositoryError(Some(cause)) = &self {
            tracing::error!(error = %cause, "repository error");
        }
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ledger> for LedgerResponse {
    fn from(ledger: Ledger) -> Self {
        Self {
            id: ledger.id,
            tenant_id: ledger.tenant_id,
            name: ledger.name,
            created_at: ledger.created_at,
            updated_at: ledger.updated_at,
        }
    }
}

/// Monetary values are serialized as decimal strings (spec.md §6), never as
/// JSON numbers, to avoid float-precision loss in clients.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ledger_id: Uuid,
    pub name: String,
    pub currency: String,
    pub balance_minor: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            tenant_id: account.tenant_id,
            ledger_id: account.ledger_id,
            name: account.name,
            currency: account.currency,
            balance_minor: account.balance_minor.to_string(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ledger_id: Uuid,
    pub reference: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            tenant_id: tx.tenant_id,
            ledger_id: tx.ledger_id,
            reference: tx.reference,
            currency: tx.currency,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostTransactionResponse {
    pub transaction_id: Uuid,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount_minor: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            tenant_id: entry.tenant_id,
            transaction_id: entry.transaction_id,
            account_id: entry.account_id,
            direction: entry.direction,
            amount_minor: entry.amount_minor.to_string(),
            currency: entry.currency,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            tenant_id: key.tenant_id,
            name: key.name,
            role: key.role,
            created_at: key.created_at,
            revoked_at: key.revoked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedApiKeyResponse {
    pub api_key: String,
    pub key: ApiKeyResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceLineResponse {
    pub code: Uuid,
    pub name: String,
    pub normal_balance: NormalBalance,
    pub amount_minor: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceResponse {
    pub ledger_id: Uuid,
    pub lines: Vec<TrialBalanceLineResponse>,
    pub total_debits_minor: String,
    pub total_credits_minor: String,
}

impl From<TrialBalance> for TrialBalanceResponse {
    fn from(tb: TrialBalance) -> Self {
        Self {
            ledger_id: tb.ledger_id,
            lines: tb
                .lines
                .into_iter()
                .map(|line| TrialBalanceLineResponse {
                    code: line.code,
                    name: line.name,
                    normal_balance: line.normal_balance,
                    amount_minor: line.amount_minor.to_string(),
                })
                .collect(),
            total_debits_minor: tb.total_debits_minor.to_string(),
            total_credits_minor: tb.total_credits_minor.to_string(),
        }
    }
}

/// `{data, next_cursor}` page shape (spec.md §4.4, §6).
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T, U: From<T>> From<Page<T>> for PageResponse<U> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.data.into_iter().map(U::from).collect(),
            next_cursor: page.next_cursor.map(|c| c.encode()),
        }
    }
}
