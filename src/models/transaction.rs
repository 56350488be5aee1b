use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An atomic set of entries sharing a reference and currency within one
/// ledger. `(tenant_id, reference)` is the idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ledger_id: Uuid,
    pub reference: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(tenant_id: Uuid, ledger_id: Uuid, reference: String, currency: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            ledger_id,
            reference,
            currency,
            created_at: Utc::now(),
        }
    }
}
