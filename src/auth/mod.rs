//! Auth middleware (spec.md §4.8): header extraction, `Authenticate`, and
//! admin-subtree gating, applied to every request under the versioned API
//! prefix. `/health` and `/ready` bypass this layer entirely by not being
//! nested under it in the router.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::routes::AppState;
use crate::error::AppError;
use crate::models::Role;
use crate::services::AuthContext;

const API_KEY_HEADER: &str = "x-api-key";
const ADMIN_PREFIX: &str = "/v1/admin";

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, AppError> {
    let raw_key = extract_credential(req.headers())?;
    let ctx = state.api_key_service.authenticate(&raw_key).await?;

    if req.uri().path().starts_with(ADMIN_PREFIX) && ctx.role != Role::Admin {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

fn extract_credential(headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(value) = headers.get(API_KEY_HEADER) {
        let raw = value.to_str().map_err(|_| AppError::Unauthorized("malformed X-Api-Key header".to_string()))?;
        return Ok(raw.to_string());
    }

    if let Some(value) = headers.get(AUTHORIZATION) {
        let raw = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("malformed Authorization header".to_string()))?;
        if let Some(token) = raw.strip_prefix("Bearer ") {
            return Ok(token.to_string());
        }
    }

    Err(AppError::Unauthorized("missing credential".to_string()))
}

/// Convenience extractor so handlers can write `Extension(ctx): Extension<AuthContext>`
/// without importing `axum::Extension` themselves; kept for symmetry with the
/// rest of the module but handlers use `axum::Extension<AuthContext>` directly.
pub type AuthExtension = axum::Extension<AuthContext>;
