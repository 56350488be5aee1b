use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;

use super::handlers;
use crate::auth::require_auth;
use crate::observability::HealthChecker;
use crate::repositories::PostgresRepository;
use crate::services::{ApiKeyService, LedgerService, PostingService, ReadService};

/// Application state shared across handlers. Per the concurrency model, the
/// only shared *mutable* state is the connection pool itself; every service
/// is a stateless wrapper around a cloned `Arc` of the same repository.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub posting_service: Arc<PostingService>,
    pub read_service: Arc<ReadService>,
    pub ledger_service: Arc<LedgerService>,
    pub api_key_service: Arc<ApiKeyService>,
    pub health_checker: Arc<HealthChecker>,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let repo = Arc::new(PostgresRepository::new(pool.clone()));
        Self {
            health_checker: Arc::new(HealthChecker::new(pool.clone())),
            posting_service: Arc::new(PostingService::new(repo.clone())),
            read_service: Arc::new(ReadService::new(repo.clone())),
            ledger_service: Arc::new(LedgerService::new(repo.clone(), repo.clone())),
            api_key_service: Arc::new(ApiKeyService::new(repo)),
            pool,
        }
    }
}

/// Builds the full router: unauthenticated health endpoints plus the
/// authenticated `/v1` API surface (spec.md §4.8, §6).
pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/ledgers", post(handlers::create_ledger))
        .route("/ledgers", get(handlers::list_ledgers))
        .route("/ledgers/:id", get(handlers::get_ledger))
        .route("/ledgers/:id/trial-balance", get(handlers::trial_balance))
        .route("/accounts", post(handlers::create_account))
        .route("/accounts", get(handlers::list_accounts))
        .route("/transactions", post(handlers::post_transaction))
        .route("/transactions", get(handlers::list_transactions))
        .route("/entries", get(handlers::list_entries))
        .route("/admin/api-keys", post(handlers::create_api_key))
        .route("/admin/api-keys", get(handlers::list_api_keys))
        .route("/admin/api-keys/:id/revoke", post(handlers::revoke_api_key))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .nest("/v1", v1)
        .with_state(state)
}
