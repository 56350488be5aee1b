use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use super::{
    paginate, ApiKeyRepository, LedgerReadRepository, LedgerRepository, Page, PostTransactionInput,
    PostTransactionOutcome, TrialBalance, TrialBalanceLine,
};
use crate::error::{AppError, Result};
use crate::models::{Account, ApiKey, Cursor, Entry, Ledger, NormalBalance, Role, Tenant, Transaction};

/// The single concrete repository backing all three capability traits
/// (spec.md §9: "a single concrete struct may satisfy all three").
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Binds `app.tenant_id` for the lifetime of `tx` only. `is_local = true`
    /// is load-bearing: the binding must die with the transaction, not the
    /// pooled connection, or a later borrower of the same connection would
    /// inherit a stale tenant (spec.md §9).
    async fn bind_tenant(tx: &mut PgTransaction<'_, Postgres>, tenant_id: Uuid) -> Result<()> {
        sqlx::query("SELECT set_config('app.tenant_id', $1, true)")
            .bind(tenant_id.to_string())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn ledger_belongs_to_tenant(
        tx: &mut PgTransaction<'_, Postgres>,
        tenant_id: Uuid,
        ledger_id: Uuid,
    ) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ledgers WHERE id = $1 AND tenant_id = $2)")
                .bind(ledger_id)
                .bind(tenant_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl LedgerRepository for PostgresRepository {
    async fn create_ledger(&self, tenant_id: Uuid, name: &str) -> Result<Ledger> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        let ledger = Ledger::new(tenant_id, name.to_string());
        let row = sqlx::query_as::<_, Ledger>(
            r#"
            INSERT INTO ledgers (id, tenant_id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, tenant_id, name, created_at, updated_at
            "#,
        )
        .bind(ledger.id)
        .bind(ledger.tenant_id)
        .bind(&ledger.name)
        .bind(ledger.created_at)
        .bind(ledger.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn create_account(&self, tenant_id: Uuid, ledger_id: Uuid, name: &str, currency: &str) -> Result<Account> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        if !Self::ledger_belongs_to_tenant(&mut tx, tenant_id, ledger_id).await? {
            return Err(AppError::invariant("ledger not found for tenant"));
        }

        let account = Account::new(tenant_id, ledger_id, name.to_string(), currency.to_string());
        let row = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, tenant_id, ledger_id, name, currency, balance_minor, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, tenant_id, ledger_id, name, currency, balance_minor, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(account.tenant_id)
        .bind(account.ledger_id)
        .bind(&account.name)
        .bind(&account.currency)
        .bind(account.balance_minor)
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn post_transaction(&self, input: PostTransactionInput) -> Result<PostTransactionOutcome> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, input.tenant_id).await?;

        let candidate_id = Uuid::new_v4();
        // On conflict, the no-op update still returns the existing row's id,
        // so a single round trip tells us whether we won the race.
        let (transaction_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO transactions (id, tenant_id, ledger_id, reference, currency, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (tenant_id, reference) DO UPDATE SET reference = EXCLUDED.reference
            RETURNING id
            "#,
        )
        .bind(candidate_id)
        .bind(input.tenant_id)
        .bind(input.ledger_id)
        .bind(&input.reference)
        .bind(&input.currency)
        .fetch_one(&mut *tx)
        .await?;

        if transaction_id != candidate_id {
            tx.commit().await?;
            return Ok(PostTransactionOutcome {
                transaction_id,
                created: false,
            });
        }

        for entry in &input.entries {
            let row = Entry::new(
                input.tenant_id,
                transaction_id,
                entry.account_id,
                entry.direction,
                entry.amount_minor,
                entry.currency.clone(),
            );
            sqlx::query(
                r#"
                INSERT INTO entries (id, tenant_id, transaction_id, account_id, direction, amount_minor, currency, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(row.id)
            .bind(row.tenant_id)
            .bind(row.transaction_id)
            .bind(row.account_id)
            .bind(row.direction)
            .bind(row.amount_minor)
            .bind(&row.currency)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // Ascending account_id order imposes a global lock order across
        // concurrent postings touching overlapping account sets (spec.md §5).
        let mut ordered_entries = input.entries.clone();
        ordered_entries.sort_by_key(|e| e.account_id);

        for entry in &ordered_entries {
            let delta = entry.direction.signed_delta(entry.amount_minor);
            let updated = sqlx::query(
                r#"
                UPDATE accounts
                SET balance_minor = balance_minor + $1, updated_at = now()
                WHERE id = $2 AND tenant_id = $3 AND ledger_id = $4 AND currency = $5
                "#,
            )
            .bind(delta)
            .bind(entry.account_id)
            .bind(input.tenant_id)
            .bind(input.ledger_id)
            .bind(&entry.currency)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::invariant("account ledger/currency mismatch"));
            }
        }

        tx.commit().await?;
        Ok(PostTransactionOutcome {
            transaction_id,
            created: true,
        })
    }
}

#[async_trait]
impl LedgerReadRepository for PostgresRepository {
    async fn get_ledger_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Ledger> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        let row = sqlx::query_as::<_, Ledger>(
            r#"
            SELECT id, tenant_id, name, created_at, updated_at
            FROM ledgers
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        row.ok_or_else(|| AppError::LedgerNotFound(id.to_string()))
    }

    async fn get_ledgers_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Ledger>> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        let rows = sqlx::query_as::<_, Ledger>(
            r#"
            SELECT id, tenant_id, name, created_at, updated_at
            FROM ledgers
            WHERE tenant_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows)
    }

    async fn list_accounts(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Account>> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        let fetch_limit = limit + 1;
        let rows = match cursor {
            Some(c) => {
                sqlx::query_as::<_, Account>(
                    r#"
                    SELECT id, tenant_id, ledger_id, name, currency, balance_minor, created_at, updated_at
                    FROM accounts
                    WHERE tenant_id = $1 AND (created_at > $2 OR (created_at = $2 AND id > $3))
                    ORDER BY created_at ASC, id ASC
                    LIMIT $4
                    "#,
                )
                .bind(tenant_id)
                .bind(c.created_at)
                .bind(c.id)
                .bind(fetch_limit)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Account>(
                    r#"
                    SELECT id, tenant_id, ledger_id, name, currency, balance_minor, created_at, updated_at
                    FROM accounts
                    WHERE tenant_id = $1
                    ORDER BY created_at ASC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(tenant_id)
                .bind(fetch_limit)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(paginate(rows, limit))
    }

    async fn list_transactions(
        &self,
        tenant_id: Uuid,
        limit: i64,
        cursor: Option<Cursor>,
    ) -> Result<Page<Transaction>> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        let fetch_limit = limit + 1;
        let rows = match cursor {
            Some(c) => {
                sqlx::query_as::<_, Transaction>(
                    r#"
                    SELECT id, tenant_id, ledger_id, reference, currency, created_at
                    FROM transactions
                    WHERE tenant_id = $1 AND (created_at > $2 OR (created_at = $2 AND id > $3))
                    ORDER BY created_at ASC, id ASC
                    LIMIT $4
                    "#,
                )
                .bind(tenant_id)
                .bind(c.created_at)
                .bind(c.id)
                .bind(fetch_limit)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Transaction>(
                    r#"
                    SELECT id, tenant_id, ledger_id, reference, currency, created_at
                    FROM transactions
                    WHERE tenant_id = $1
                    ORDER BY created_at ASC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(tenant_id)
                .bind(fetch_limit)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(paginate(rows, limit))
    }

    async fn list_entries(&self, tenant_id: Uuid, limit: i64, cursor: Option<Cursor>) -> Result<Page<Entry>> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        let fetch_limit = limit + 1;
        let rows = match cursor {
            Some(c) => {
                sqlx::query_as::<_, Entry>(
                    r#"
                    SELECT id, tenant_id, transaction_id, account_id, direction, amount_minor, currency, created_at
                    FROM entries
                    WHERE tenant_id = $1 AND (created_at > $2 OR (created_at = $2 AND id > $3))
                    ORDER BY created_at ASC, id ASC
                    LIMIT $4
                    "#,
                )
                .bind(tenant_id)
                .bind(c.created_at)
                .bind(c.id)
                .bind(fetch_limit)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Entry>(
                    r#"
                    SELECT id, tenant_id, transaction_id, account_id, direction, amount_minor, currency, created_at
                    FROM entries
                    WHERE tenant_id = $1
                    ORDER BY created_at ASC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(tenant_id)
                .bind(fetch_limit)
                .fetch_all(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(paginate(rows, limit))
    }

    async fn trial_balance(&self, tenant_id: Uuid, ledger_id: Uuid) -> Result<TrialBalance> {
        let mut tx = self.pool.begin().await?;
        Self::bind_tenant(&mut tx, tenant_id).await?;

        if !Self::ledger_belongs_to_tenant(&mut tx, tenant_id, ledger_id).await? {
            return Err(AppError::LedgerNotFound(ledger_id.to_string()));
        }

        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, tenant_id, ledger_id, name, currency, balance_minor, created_at, updated_at
            FROM accounts
            WHERE tenant_id = $1 AND ledger_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(tenant_id)
        .bind(ledger_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

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
                "trial balance totals diverged for ledger {ledger_id}: debits={total_debits_minor} credits={total_credits_minor}"
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
impl ApiKeyRepository for PostgresRepository {
    async fn count_all_keys(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_tenant(&self, name: &str) -> Result<Tenant> {
        let tenant = Tenant::new(name.to_string());
        let row = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(tenant.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert_api_key(&self, tenant_id: Uuid, name: &str, role: Role, key_hash: &str) -> Result<ApiKey> {
        let row = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (id, tenant_id, name, role, key_hash, created_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, now(), NULL)
            RETURNING id, tenant_id, name, role, key_hash, created_at, revoked_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(name)
        .bind(role)
        .bind(key_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        let row = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, tenant_id, name, role, key_hash, created_at, revoked_at
            FROM api_keys
            WHERE key_hash = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<ApiKey>> {
        let rows = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT id, tenant_id, name, role, key_hash, created_at, revoked_at
            FROM api_keys
            WHERE tenant_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn revoke(&self, tenant_id: Uuid, api_key_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE api_keys
            SET revoked_at = now()
            WHERE id = $1 AND tenant_id = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(api_key_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
