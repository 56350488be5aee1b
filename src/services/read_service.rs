use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, Cursor, Entry, Transaction};
use crate::repositories::{LedgerReadRepository, Page, TrialBalance};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Listing and trial-balance reads (spec.md §4.4, §4.5). Every method is
/// tenant-scoped; the caller's `tenant_id` always comes from `AuthContext`,
/// never from request input.
pub struct ReadService {
    repo: Arc<dyn LedgerReadRepository>,
}

impl ReadService {
    pub fn new(repo: Arc<dyn LedgerReadRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_accounts(&self, tenant_id: Uuid, limit: Option<i64>, cursor: Option<&str>) -> Result<Page<Account>> {
        let limit = Self::normalize_limit(limit)?;
        let cursor = Self::decode_cursor(cursor)?;
        self.repo.list_accounts(tenant_id, limit, cursor).await
    }

    pub async fn list_transactions(
        &self,
        tenant_id: Uuid,
        limit: Option<i64>,
        cursor: Option<&str>,
    ) -> Result<Page<Transaction>> {
        let limit = Self::normalize_limit(limit)?;
        let cursor = Self::decode_cursor(cursor)?;
        self.repo.list_transactions(tenant_id, limit, cursor).await
    }

    pub async fn list_entries(&self, tenant_id: Uuid, limit: Option<i64>, cursor: Option<&str>) -> Result<Page<Entry>> {
        let limit = Self::normalize_limit(limit)?;
        let cursor = Self::decode_cursor(cursor)?;
        self.repo.list_entries(tenant_id, limit, cursor).await
    }

    pub async fn trial_balance(&self, tenant_id: Uuid, ledger_id: Uuid) -> Result<TrialBalance> {
        self.repo.trial_balance(tenant_id, ledger_id).await
    }

    /// spec.md §4.4: limit defaults to 50, clamped to `[1, 200]`; anything
    /// outside that range is a caller error, not a silent clamp.
    fn normalize_limit(limit: Option<i64>) -> Result<i64> {
        match limit {
            None => Ok(DEFAULT_LIMIT),
            Some(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
            Some(limit) => Err(AppError::invariant(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            ))),
        }
    }

    fn decode_cursor(raw: Option<&str>) -> Result<Option<Cursor>> {
        raw.map(Cursor::decode).transpose()
    }
}
