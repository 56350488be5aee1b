//! Closed domain error taxonomy shared by every service and the HTTP boundary.

use thiserror::Error;

/// Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

/// The only error kinds that are allowed to cross the service/HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// The ledger referenced by a tenant-scoped lookup does not exist.
    #[error("Ledger not found: {0}")]
    LedgerNotFound(String),

    /// A domain invariant was violated (unbalanced posting, bad cursor, duplicate
    /// key race that still produced no row, malformed reference, ...).
    #[error("{0}")]
    InvariantViolation(String),

    /// Something below the service layer failed in a way callers cannot act on
    /// (connection error, constraint violation not attributable to caller input,
    /// corrupted totals). The original cause is kept for logs, never for clients.
    #[error("Internal repository error")]
    RepositoryError(#[source] Option<anyhow::Error>),

    /// No credential, or a credential that does not resolve to an active key.
    #[error("{0}")]
    Unauthorized(String),

    /// A valid credential was presented but the caller's role does not permit
    /// the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The request failed to parse into the expected shape at the HTTP edge:
    /// malformed JSON, a non-UUID path segment, a malformed query string.
    /// Distinct from `InvariantViolation`, which is a well-formed request
    /// that violates a domain rule.
    #[error("{0}")]
    InvalidInput(String),
}

impl AppError {
    /// Stable machine code returned in the `error` field of HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::LedgerNotFound(_) => "LEDGER_NOT_FOUND",
            AppError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            AppError::RepositoryError(_) => "REPOSITORY_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// HTTP status code this error maps to, per the error-handling design.
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            AppError::LedgerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvariantViolation(_) => StatusCode::BAD_REQUEST,
            AppError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message shown to the caller. Repository-error causes are never
    /// surfaced here, only logged.
    pub fn public_message(&self) -> String {
        match self {
            AppError::RepositoryError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn repository(cause: impl Into<anyhow::Error>) -> Self {
        AppError::RepositoryError(Some(cause.into()))
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        AppError::InvariantViolation(message.into())
    }
}

/// Translates a `sqlx` failure into the domain taxonomy. Constraint violations
/// the caller could have avoided (uniqueness, foreign key, check, not-null,
/// malformed literal) become `InvariantViolation`; everything else, including
/// numeric-range overflow on a balance update, is an opaque `RepositoryError`
/// whose cause is retained for logs only.
///
/// Numeric-range overflow (`22003`) is deliberately NOT classified as caller
/// error here: it only ever arises from the balance-update step of posting,
/// where it signals account corruption rather than bad input, and must
/// surface as `RepositoryError`.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            let is_constraint = matches!(
                code.as_deref(),
                Some("23505") // unique_violation
                    | Some("23503") // foreign_key_violation
                    | Some("23514") // check_violation
                    | Some("23502") // not_null_violation
                    | Some("22P02") // invalid_text_representation
            );
            if is_constraint {
                return AppError::InvariantViolation(db_err.message().to_string());
            }
        }
        AppError::RepositoryError(Some(anyhow::Error::new(err)))
    }
}
