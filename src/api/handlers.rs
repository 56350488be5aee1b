use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::api::requests::{
    BootstrapRequest, CreateAccountRequest, CreateApiKeyRequest, CreateLedgerRequest, ListQuery,
    PostTransactionRequest,
};
use crate::api::responses::{
    AccountResponse, ApiKeyResponse, CreatedApiKeyResponse, EntryResponse, LedgerResponse, PageResponse,
    PostTransactionResponse, TransactionResponse, TrialBalanceResponse,
};
use crate::error::AppError;
use crate::services::{AuthContext, PostTransactionRequest as ServicePostTransactionRequest, PostingLine};

use super::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let health = state.health_checker.check_all().await;
    Json(serde_json::json!({ "status": health.status, "version": health.version }))
}

pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    if state.health_checker.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn create_ledger(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateLedgerRequest>,
) -> Result<(StatusCode, Json<LedgerResponse>), AppError> {
    let ledger = state.ledger_service.create_ledger(ctx.tenant_id, &request.name).await?;
    Ok((StatusCode::CREATED, Json(ledger.into())))
}

pub async fn list_ledgers(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<LedgerResponse>>, AppError> {
    let ledgers = state.ledger_service.get_ledgers_by_tenant(ctx.tenant_id).await?;
    Ok(Json(ledgers.into_iter().map(LedgerResponse::from).collect()))
}

pub async fn get_ledger(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<Json<LedgerResponse>, AppError> {
    let ledger = state.ledger_service.get_ledger_by_id(ctx.tenant_id, id).await?;
    Ok(Json(ledger.into()))
}

pub async fn trial_balance(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedPath(ledger_id): ValidatedPath<Uuid>,
) -> Result<Json<TrialBalanceResponse>, AppError> {
    let tb = state.read_service.trial_balance(ctx.tenant_id, ledger_id).await?;
    Ok(Json(tb.into()))
}

pub async fn create_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = state
        .ledger_service
        .create_account(ctx.tenant_id, request.ledger_id, &request.name, &request.currency)
        .await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<PageResponse<AccountResponse>>, AppError> {
    let page = state
        .read_service
        .list_accounts(ctx.tenant_id, query.limit, query.cursor.as_deref())
        .await?;
    Ok(Json(page.into()))
}

pub async fn post_transaction(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<PostTransactionRequest>,
) -> Result<(StatusCode, Json<PostTransactionResponse>), AppError> {
    let outcome = state
        .posting_service
        .post_transaction(ServicePostTransactionRequest {
            tenant_id: ctx.tenant_id,
            ledger_id: request.ledger_id,
            reference: request.reference,
            currency: request.currency,
            entries: request
                .entries
                .into_iter()
                .map(|e| PostingLine {
                    account_id: e.account_id,
                    direction: e.direction,
                    amount_minor: e.amount_minor,
                    currency: e.currency,
                })
                .collect(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostTransactionResponse {
            transaction_id: outcome.transaction_id,
            created: outcome.created,
        }),
    ))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<PageResponse<TransactionResponse>>, AppError> {
    let page = state
        .read_service
        .list_transactions(ctx.tenant_id, query.limit, query.cursor.as_deref())
        .await?;
    Ok(Json(page.into()))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<PageResponse<EntryResponse>>, AppError> {
    let page = state
        .read_service
        .list_entries(ctx.tenant_id, query.limit, query.cursor.as_deref())
        .await?;
    Ok(Json(page.into()))
}

pub async fn create_api_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedJson(request): ValidatedJson<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreatedApiKeyResponse>), AppError> {
    let created = state
        .api_key_service
        .create_api_key(ctx, ctx.tenant_id, &request.name, request.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedApiKeyResponse {
            api_key: created.raw_key,
            key: created.key.into(),
        }),
    ))
}

pub async fn list_api_keys(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<ApiKeyResponse>>, AppError> {
    let keys = state.api_key_service.list_api_keys(ctx).await?;
    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.api_key_service.revoke_api_key(ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Invoked once at startup, not routed — see `main.rs`.
pub async fn bootstrap(state: &AppState, request: BootstrapRequest) -> Result<bool, AppError> {
    let outcome = state
        .api_key_service
        .bootstrap_initial_admin(crate::services::BootstrapRequest {
            tenant_name: request.tenant_name,
            key_name: request.key_name,
            raw_api_key: request.raw_api_key,
        })
        .await?;
    Ok(outcome.created)
}
