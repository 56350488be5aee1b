//! In-memory fakes for the three repository traits, used by unit tests
//! (spec.md §9: "Tests use in-memory fakes").

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    paginate, ApiKeyRepository, LedgerReadRepository, LedgerRepository, Page, PostTransactionInput,
    PostTransactionOutcome, TrialBalance, TrialBalanceLine,
};
use crate::error::{AppError, Result};
use crate::models::{Account, ApiKey, Cursor, Entry, Ledger, NormalBalance, Role, Tenant, Transaction};

#[derive(Default)]
pub struct InMemoryRepository {
    tenants: Mutex<HashMap<Uuid, Tenant>>,
    ledgers: Mutex<HashMap<Uuid, Ledger>>,
    accounts: Mutex<HashMap<Uuid, Account>>,
    transactions: Mutex<HashMap<Uuid, Transaction>>,
    transactions_by_reference: Mutex<HashMap<(Uuid, String), Uuid>>,
    entries: Mutex<HashMap<Uuid, Entry>>,
    api_keys: Mutex<HashMap<Uuid, ApiKey>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryRepository {
    async fn create_ledger(&self, tenant_id: Uuid, name: &str) -> Result<Ledger> {
        let ledger = Ledger::new(tenant_id, name.to_string());
        self.ledgers.lock().unwrap().insert(ledger.id, ledger.clone());
        Ok(ledger)
    }

    async fn create_account(&self, tenant_id: Uuid, ledger_id: Uuid, name: &str, currency: &str) -> Result<Account> {
        let belongs = self
            .ledgers
            .lock()
            .unwrap()
            .get(&ledger_id)
            .map(|l| l.tenant_id == tenant_id)
            .unwrap_or(false);
        if !belongs {
            return Err(AppError::invariant("ledger not found for tenant"));
        }

        let account = Account::new(tenant_id, ledger_id, name.to_string(), currency.to_string());
        self.accounts.lock().unwrap().insert(account.id, account.clone());
        Ok(account)
    }

    async fn post_transaction(&self, input: PostTransactionInput) -> Result<PostTransactionOutcome> {
        let key = (input.tenant_id, input.reference.clone());
        if let Some(existing_id) = self.transactions_by_reference.lock().unwrap().get(&key) {
            return Ok(PostTransactionOutcome {
                transaction_id: *existing_id,
                created: false,
            });
        }

        let mut ordered_entries = input.entries.clone();
        ordered_entries.sort_by_key(|e| e.account_id);

        {
            let accounts = self.accounts.lock().unwrap();
            for entry in &ordered_entries {
                let matches = accounts
                    .get(&entry.account_id)
                    .map(|a| a.tenant_id == input.tenant_id && a.ledger_id == input.ledger_id && a.currency == entry.currency)
                    .unwrap_or(false);
                if !matches {
                    return Err(AppError::invariant("account ledger/currency mismatch"));
                }
            }
        }

        // Overflow must abort before any row is written (atomicity, spec.md
        // §8 property 4) and surface as RepositoryError, not InvariantViolation
        // (spec.md §8 scenario S4): it signals corruption, not bad input.
        {
            let accounts = self.accounts.lock().unwrap();
            for entry in &ordered_entries {
                let current = accounts.get(&entry.account_id).unwrap().balance_minor;
                let delta = entry.direction.signed_delta(entry.amount_minor);
                if current.checked_add(delta).is_none() {
                    return Err(AppError::repository(anyhow::anyhow!(
                        "balance overflow on account {}",
                        entry.account_id
                    )));
                }
            }
        }

        let transaction = Transaction::new(
            input.tenant_id,
            input.ledger_id,
            input.reference.clone(),
            input.currency.clone(),
        );
        let transaction_id = transaction.id;

        {
            let mut by_reference = self.transactions_by_reference.lock().unwrap();
            if let Some(existing_id) = by_reference.get(&key) {
                return Ok(PostTransactionOutcome {
                    transaction_id: *existing_id,
                    created: false,
                });
            }
            by_reference.insert(key, transaction_id);
        }
        self.transactions.lock().unwrap().insert(transaction_id, transaction);

        for entry in &input.entries {
            let row = Entry::new(
                input.tenant_id,
                transaction_id,
                entry.account_id,
                entry.direction,
                entry.amount_minor,
                entry.currency.clone(),
            );
            self.entries.lock().unwrap().insert(row.id, row);
        }

        {
            let mut accounts = self.accounts.lock().unwrap();
            for entry in &ordered_entries {
                let delta = entry.direction.signed_delta(entry.amount_minor);
                let account = accounts.get_mut(&entry.account_id).unwrap();
                account.balance_minor += delta;
                account.updated_at = Utc::now();
            }
        }

        Ok(PostTransactionOutcome {
            transaction_id,
            created: true,
        })
    }
}

#[async_trait]
impl LedgerReadRepository for InMemoryRepository {
    async fn get_ledger_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Ledger> {
        self.ledgers
            .lock()
            .unwrap()
            .get(&id)
            .filter(|l| l.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| AppError::LedgerNotFound(id.to_string()))
    }

    async fn get_ledgers_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Ledger>> {
        let mut ledgers: Vec<Ledger> = self
            .ledgers
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.tenant_id == tenant_id)
            .cloned()
            .collect();
        ledgers.sort_by_key(|l| (l.created_at, l.id));
        Ok(ledgers)
    }

    async fn list_accounts(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.tenant_id == tenant_id)
            .filter(|a| after_cursor(a.created_at, a.id, &cursor))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.created_at, a.id));
        accounts.truncate((limit + 1) as usize);
        Ok(paginate(accounts, limit))
    }

    async fn list_transactions(
        &self,
        tenant_id: Uuid,
        limit: i64,
        cursor: Option<Cursor>,
    ) -> Result<Page<Transaction>> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.tenant_id == tenant_id)
            .filter(|t| after_cursor(t.created_at, t.id, &cursor))
            .cloned()
            .collect();
        transactions.sort_by_key(|t| (t.created_at, t.id));
        transactions.truncate((limit + 1) as usize);
        Ok(paginate(transactions, limit))
    }

    async fn list_entries(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Entry>> {
        let mut entries: Vec<Entry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.tenant_id == tenant_id)
            .filter(|e| after_cursor(e.created_at, e.id, &cursor))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.created_at, e.id));
        entries.truncate((limit + 1) as usize);
        Ok(paginate(entries, limit))
    }

    async fn trial_balance(&self, tenant_id: Uuid, ledger_id: Uuid) -> Result<TrialBalance> {
        let belongs = self
            .ledgers
            .lock()
            .unwrap()
            .get(&ledger_id)
            .map(|l| l.tenant_id == tenant_id)
            .unwrap_or(false);
        if !belongs {
            return Err(AppError::LedgerNotFound(ledger_id.to_string()));
        }

        let mut accounts: Vec<Account> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.tenant_id == tenant_id && a.ledger_id == ledger_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.created_at, a.id));

        let mut total_debits_minor: u64 = 0;
        let mut total_credits_minor: u64 = 0;
        let mut lines = Vec::with_capacity(accounts.len());

        for account in accounts {
            let normal_balance = account.normal_balance();
            let amount_minor = account.absolute_balance();
            match normal_balance {
                NormalBalance::Debit => total_debits_minor += amount_minor,
                NormalBalance::Credit => total_credits_minor += amount_minor,
            }
            lines.push(TrialBalanceLine {
                code: account.id,
                name: account.name,
                normal_balance,
                amount_minor,
            });
        }

        if total_debits_minor != total_credits_minor {
            return Err(AppError::repository(anyhow::anyhow!(
                "trial balance totals diverged for ledger {ledger_id}"
            )));
        }

        Ok(TrialBalance {
            ledger_id,
            lines,
            total_debits_minor,
            total_credits_minor,
        })
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryRepository {
    async fn count_all_keys(&self) -> Result<i64> {
        Ok(self.api_keys.lock().unwrap().len() as i64)
    }

    async fn create_tenant(&self, name: &str) -> Result<Tenant> {
        let tenant = Tenant::new(name.to_string());
        self.tenants.lock().unwrap().insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn insert_api_key(&self, tenant_id: Uuid, name: &str, role: Role, key_hash: &str) -> Result<ApiKey> {
        let key = ApiKey {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.to_string(),
            role,
            key_hash: key_hash.to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        };
        self.api_keys.lock().unwrap().insert(key.id, key.clone());
        Ok(key)
    }

    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        Ok(self
            .api_keys
            .lock()
            .unwrap()
            .values()
            .find(|k| k.key_hash == key_hash && k.is_active())
            .cloned())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<ApiKey>> {
        let mut keys: Vec<ApiKey> = self
            .api_keys
            .lock()
            .unwrap()
            .values()
            .filter(|k| k.tenant_id == tenant_id)
            .cloned()
            .collect();
        keys.sort_by_key(|k| (k.created_at, k.id));
        Ok(keys)
    }

    async fn revoke(&self, tenant_id: Uuid, api_key_id: Uuid) -> Result<bool> {
        let mut keys = self.api_keys.lock().unwrap();
        match keys.get_mut(&api_key_id) {
            Some(key) if key.tenant_id == tenant_id && key.is_active() => {
                key.revoked_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn after_cursor(created_at: chrono::DateTime<Utc>, id: Uuid, cursor: &Option<Cursor>) -> bool {
    match cursor {
        None => true,
        Some(c) => created_at > c.created_at || (created_at == c.created_at && id > c.id),
    }
}
