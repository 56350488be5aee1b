use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One directional contribution against one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "direction", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// The signed delta this direction applies to an account's balance.
    /// DEBIT decreases, CREDIT increases (spec.md §4.3).
    pub fn signed_delta(&self, amount_minor: i64) -> i64 {
        match self {
            Direction::Debit => -amount_minor,
            Direction::Credit => amount_minor,
        }
    }
}

/// A single entry (posting). `amount_minor` is always positive; direction
/// carries the sign.
///
/// Entries carry a denormalized `tenant_id` so the entries listing stays a
/// single-table, RLS-covered query (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        tenant_id: Uuid,
        transaction_id: Uuid,
        account_id: Uuid,
        direction: Direction,
        amount_minor: i64,
        currency: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            transaction_id,
            account_id,
            direction,
            amount_minor,
            currency,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_decreases_balance() {
        assert_eq!(Direction::Debit.signed_delta(100), -100);
    }

    #[test]
    fn credit_increases_balance() {
        assert_eq!(Direction::Credit.signed_delta(100), 100);
    }
}
