use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Direction;
use crate::repositories::{EntryInput, LedgerRepository, PostTransactionInput, PostTransactionOutcome};

/// One posting line as received from the API boundary, before it is turned
/// into a repository-level `EntryInput`. `currency` is the line's own
/// declared currency (spec.md §4.2 step 1), checked against the
/// transaction's currency in `validate` below.
#[derive(Debug, Clone)]
pub struct PostingLine {
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct PostTransactionRequest {
    pub tenant_id: Uuid,
    pub ledger_id: Uuid,
    pub reference: String,
    pub currency: String,
    pub entries: Vec<PostingLine>,
}

/// Validates and executes `PostTransaction` (spec.md §4.2).
///
/// Pre-validation happens here so a malformed request never reaches the
/// repository layer; the repository is left to enforce only what needs a
/// database round trip (ledger/account existence, idempotency, atomic
/// balance mutation).
pub struct PostingService {
    repo: Arc<dyn LedgerRepository>,
}

impl PostingService {
    pub fn new(repo: Arc<dyn LedgerRepository>) -> Self {
        Self { repo }
    }

    pub async fn post_transaction(&self, request: PostTransactionRequest) -> Result<PostTransactionOutcome> {
        Self::validate(&request)?;

        let input = PostTransactionInput {
            tenant_id: request.tenant_id,
            ledger_id: request.ledger_id,
            reference: request.reference,
            currency: request.currency,
            entries: request
                .entries
                .into_iter()
                .map(|e| EntryInput {
                    account_id: e.account_id,
                    direction: e.direction,
                    amount_minor: e.amount_minor,
                    currency: e.currency,
                })
                .collect(),
        };

        self.repo.post_transaction(input).await
    }

    /// spec.md §4.2 step 1: at least two entries, every amount strictly
    /// positive, reference non-empty, and debits must equal credits.
    fn validate(request: &PostTransactionRequest) -> Result<()> {
        if request.reference.trim().is_empty() {
            return Err(AppError::invariant("reference must not be empty"));
        }

        if request.currency.trim().is_empty() {
            return Err(AppError::invariant("currency must not be empty"));
        }

        if request.entries.len() < 2 {
            return Err(AppError::invariant("a transaction needs at least two entries"));
        }

        let mut total_debits: i128 = 0;
        let mut total_credits: i128 = 0;

        for entry in &request.entries {
            if entry.amount_minor <= 0 {
                return Err(AppError::invariant("entry amounts must be positive"));
            }
            if entry.currency != request.currency {
                return Err(AppError::invariant("entry currency must match transaction currency"));
            }
            match entry.direction {
                Direction::Debit => total_debits += entry.amount_minor as i128,
                Direction::Credit => total_credits += entry.amount_minor as i128,
            }
        }

        if total_debits != total_credits {
            return Err(AppError::invariant("debits and credits must balance"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;

    fn line(account_id: Uuid, direction: Direction, amount_minor: i64) -> PostingLine {
        PostingLine {
            account_id,
            direction,
            amount_minor,
            currency: "USD".to_string(),
        }
    }

    #[tokio::test]
    async fn rejects_unbalanced_entries() {
        let service = PostingService::new(Arc::new(InMemoryRepository::new()));
        let cash = Uuid::new_v4();
        let revenue = Uuid::new_v4();

        let result = service
            .post_transaction(PostTransactionRequest {
                tenant_id: Uuid::new_v4(),
                ledger_id: Uuid::new_v4(),
                reference: "r1".to_string(),
                currency: "USD".to_string(),
                entries: vec![line(cash, Direction::Debit, 100), line(revenue, Direction::Credit, 90)],
            })
            .await;

        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn rejects_single_entry() {
        let service = PostingService::new(Arc::new(InMemoryRepository::new()));

        let result = service
            .post_transaction(PostTransactionRequest {
                tenant_id: Uuid::new_v4(),
                ledger_id: Uuid::new_v4(),
                reference: "r1".to_string(),
                currency: "USD".to_string(),
                entries: vec![line(Uuid::new_v4(), Direction::Debit, 100)],
            })
            .await;

        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let service = PostingService::new(Arc::new(InMemoryRepository::new()));

        let result = service
            .post_transaction(PostTransactionRequest {
                tenant_id: Uuid::new_v4(),
                ledger_id: Uuid::new_v4(),
                reference: "r1".to_string(),
                currency: "USD".to_string(),
                entries: vec![line(Uuid::new_v4(), Direction::Debit, 0), line(Uuid::new_v4(), Direction::Credit, 0)],
            })
            .await;

        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }

    #[tokio::test]
    async fn rejects_entry_currency_that_does_not_match_transaction_currency() {
        let service = PostingService::new(Arc::new(InMemoryRepository::new()));
        let cash = Uuid::new_v4();
        let revenue = Uuid::new_v4();

        let mut mismatched = line(revenue, Direction::Credit, 100);
        mismatched.currency = "EUR".to_string();

        let result = service
            .post_transaction(PostTransactionRequest {
                tenant_id: Uuid::new_v4(),
                ledger_id: Uuid::new_v4(),
                reference: "r1".to_string(),
                currency: "USD".to_string(),
                entries: vec![line(cash, Direction::Debit, 100), mismatched],
            })
            .await;

        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }
}
