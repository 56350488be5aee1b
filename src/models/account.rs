use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A balance-bearing entity within a ledger and a single currency.
///
/// `balance_minor` is the algebraic sum of every committed entry's signed
/// contribution (CREDIT positive, DEBIT negative).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub ledger_id: Uuid,
    pub name: String,
    pub currency: String,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trial-balance classification of an account, derived purely from the sign
/// of its current balance. This is a stated convention, not a derivation
/// from a chart-of-accounts type (the data model carries none): a
/// zero-balance account is classified DEBIT normal. See `TrialBalanceLine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalBalance {
    Debit,
    Credit,
}

impl Account {
    pub fn new(tenant_id: Uuid, ledger_id: Uuid, name: String, currency: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            ledger_id,
            name,
            currency,
            balance_minor: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// `balance <= 0` is DEBIT normal; `balance > 0` is CREDIT normal.
    pub fn normal_balance(&self) -> NormalBalance {
        if self.balance_minor <= 0 {
            NormalBalance::Debit
        } else {
            NormalBalance::Credit
        }
    }

    /// Absolute value of the balance, as reported in a trial balance.
    pub fn absolute_balance(&self) -> u64 {
        self.balance_minor.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_balance(balance_minor: i64) -> Account {
        let mut a = Account::new(Uuid::new_v4(), Uuid::new_v4(), "Cash".into(), "USD".into());
        a.balance_minor = balance_minor;
        a
    }

    #[test]
    fn zero_balance_is_debit_normal() {
        assert_eq!(account_with_balance(0).normal_balance(), NormalBalance::Debit);
    }

    #[test]
    fn negative_balance_is_debit_normal() {
        assert_eq!(account_with_balance(-100).normal_balance(), NormalBalance::Debit);
    }

    #[test]
    fn positive_balance_is_credit_normal() {
        assert_eq!(account_with_balance(100).normal_balance(), NormalBalance::Credit);
    }

    #[test]
    fn absolute_balance_is_unsigned() {
        assert_eq!(account_with_balance(-250).absolute_balance(), 250);
        assert_eq!(account_with_balance(250).absolute_balance(), 250);
    }
}
