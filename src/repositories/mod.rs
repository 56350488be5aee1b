pub mod memory;
pub mod postgres_repository;

pub use memory::InMemoryRepository;
pub use postgres_repository::PostgresRepository;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, ApiKey, Cursor, Direction, Entry, Ledger, NormalBalance, Role, Tenant, Transaction};

/// Database connection pool type alias.
pub type DbPool = sqlx::PgPool;

/// One posting line of a `PostTransaction` request. `currency` is the
/// entry's own declared currency, validated against the transaction
/// currency at the service layer (spec.md §4.2 step 1) independently of
/// the account-currency check the repository performs during the balance
/// update.
#[derive(Debug, Clone)]
pub struct EntryInput {
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount_minor: i64,
    pub currency: String,
}

/// A balanced set of entries to post atomically (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct PostTransactionInput {
    pub tenant_id: Uuid,
    pub ledger_id: Uuid,
    pub reference: String,
    pub currency: String,
    pub entries: Vec<EntryInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostTransactionOutcome {
    pub transaction_id: Uuid,
    pub created: bool,
}

/// A page of a cursor-based listing (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<Cursor>,
}

/// One line of a trial balance. `code` is the account id: spec.md §9 records
/// this as an accepted limitation rather than a first-class chart-of-accounts
/// code, which the data model does not carry.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceLine {
    pub code: Uuid,
    pub name: String,
    pub normal_balance: NormalBalance,
    pub amount_minor: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialBalance {
    pub ledger_id: Uuid,
    pub lines: Vec<TrialBalanceLine>,
    pub total_debits_minor: u64,
    pub total_credits_minor: u64,
}

/// Transactional writes against ledgers, accounts, and transactions
/// (spec.md §4.2, §4.6 create path).
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn create_ledger(&self, tenant_id: Uuid, name: &str) -> Result<Ledger>;
    async fn create_account(&self, tenant_id: Uuid, ledger_id: Uuid, name: &str, currency: &str) -> Result<Account>;
    async fn post_transaction(&self, input: PostTransactionInput) -> Result<PostTransactionOutcome>;
}

/// Tenant-scoped reads: ledger lookups, the three cursor listings, and the
/// trial balance scan (spec.md §4.4–§4.6).
#[async_trait]
pub trait LedgerReadRepository: Send + Sync {
    async fn get_ledger_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Ledger>;
    async fn get_ledgers_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Ledger>>;
    async fn list_accounts(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Account>>;
    async fn list_transactions(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Transaction>>;
    async fn list_entries(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Entry>>;
    async fn trial_balance(&self, tenant_id: Uuid, ledger_id: Uuid) -> Result<TrialBalance>;
}

/// Key issuance, lookup, and tenant/admin bootstrap (spec.md §4.7).
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn count_all_keys(&self) -> Result<i64>;
    async fn create_tenant(&self, name: &str) -> Result<Tenant>;
    async fn insert_api_key(&self, tenant_id: Uuid, name: &str, role: Role, key_hash: &str) -> Result<ApiKey>;
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>>;
    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<ApiKey>>;
    async fn revoke(&self, tenant_id: Uuid, api_key_id: Uuid) -> Result<bool>;
}

/// Shared cursor-ordering key for the three listing entities.
pub(crate) trait CursorKeyed {
    fn cursor(&self) -> Cursor;
}

impl CursorKeyed for Account {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at, self.id)
    }
}

impl CursorKeyed for Transaction {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at, self.id)
    }
}

impl CursorKeyed for Entry {
    fn cursor(&self) -> Cursor {
        Cursor::new(self.created_at, self.id)
    }
}

/// Turns an over-fetched (`limit + 1`) row set into a page plus the next
/// cursor, per spec.md §4.4.
pub(crate) fn paginate<T: CursorKeyed>(mut rows: Vec<T>, limit: i64) -> Page<T> {
    let limit = limit as usize;
    let next_cursor = if rows.len() > limit {
        rows.truncate(limit);
        rows.last().map(CursorKeyed::cursor)
    } else {
        None
    };
    Page { data: rows, next_cursor }
}
