use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Account, Ledger};
use crate::repositories::{LedgerReadRepository, LedgerRepository};

/// Ledger and account lifecycle (spec.md §4.6): creation plus tenant-scoped
/// lookups. Trial balance and the cursor listings live in `ReadService`.
pub struct LedgerService {
    write_repo: Arc<dyn LedgerRepository>,
    read_repo: Arc<dyn LedgerReadRepository>,
}

impl LedgerService {
    pub fn new(write_repo: Arc<dyn LedgerRepository>, read_repo: Arc<dyn LedgerReadRepository>) -> Self {
        Self { write_repo, read_repo }
    }

    pub async fn create_ledger(&self, tenant_id: Uuid, name: &str) -> Result<Ledger> {
        if name.trim().is_empty() {
            return Err(AppError::invariant("ledger name must not be empty"));
        }
        self.write_repo.create_ledger(tenant_id, name).await
    }

    pub async fn create_account(&self, tenant_id: Uuid, ledger_id: Uuid, name: &str, currency: &str) -> Result<Account> {
        if name.trim().is_empty() {
            return Err(AppError::invariant("account name must not be empty"));
        }
        if currency.trim().len() != 3 {
            return Err(AppError::invariant("currency must be a 3-letter code"));
        }
        self.write_repo
            .create_account(tenant_id, ledger_id, name, &currency.to_uppercase())
            .await
    }

    pub async fn get_ledger_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Ledger> {
        self.read_repo.get_ledger_by_id(tenant_id, id).await
    }

    pub async fn get_ledgers_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Ledger>> {
        self.read_repo.get_ledgers_by_tenant(tenant_id).await
    }
}
