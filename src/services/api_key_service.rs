use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{api_key, ApiKey, Role, Tenant};
use crate::repositories::ApiKeyRepository;

/// The tenant/role pair a successful `Authenticate` call resolves to, carried
/// through the request as `AuthContext` (spec.md §4.7, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub api_key_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
}

pub struct CreatedApiKey {
    pub raw_key: String,
    pub key: ApiKey,
}

pub struct BootstrapRequest {
    pub tenant_name: String,
    pub key_name: String,
    pub raw_api_key: String,
}

pub struct BootstrapOutcome {
    pub created: bool,
    pub tenant: Option<Tenant>,
    pub key: Option<ApiKey>,
}

/// Key issuance, lookup, and tenant/admin bootstrap (spec.md §4.7).
pub struct ApiKeyService {
    repo: Arc<dyn ApiKeyRepository>,
}

impl ApiKeyService {
    pub fn new(repo: Arc<dyn ApiKeyRepository>) -> Self {
        Self { repo }
    }

    pub async fn authenticate(&self, raw_key: &str) -> Result<AuthContext> {
        let raw_key = raw_key.trim();
        if raw_key.is_empty() {
            return Err(AppError::Unauthorized("missing credential".to_string()));
        }

        let hash = api_key::hash_key(raw_key);
        let key = self
            .repo
            .find_active_by_hash(&hash)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or revoked API key".to_string()))?;

        Ok(AuthContext {
            api_key_id: key.id,
            tenant_id: key.tenant_id,
            role: key.role,
        })
    }

    pub async fn create_api_key(&self, actor: AuthContext, tenant_id: Uuid, name: &str, role: Role) -> Result<CreatedApiKey> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden("only ADMIN callers may create API keys".to_string()));
        }
        if actor.tenant_id != tenant_id {
            return Err(AppError::Forbidden("cannot issue keys for another tenant".to_string()));
        }
        if name.trim().is_empty() {
            return Err(AppError::invariant("key name must not be empty"));
        }

        let (raw_key, hash) = api_key::generate_raw_key();
        let key = self.repo.insert_api_key(tenant_id, name, role, &hash).await?;

        Ok(CreatedApiKey { raw_key, key })
    }

    pub async fn list_api_keys(&self, actor: AuthContext) -> Result<Vec<ApiKey>> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden("only ADMIN callers may list API keys".to_string()));
        }
        self.repo.list_by_tenant(actor.tenant_id).await
    }

    pub async fn revoke_api_key(&self, actor: AuthContext, api_key_id: Uuid) -> Result<()> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden("only ADMIN callers may revoke API keys".to_string()));
        }

        let revoked = self.repo.revoke(actor.tenant_id, api_key_id).await?;
        if !revoked {
            return Err(AppError::invariant("API key not found"));
        }
        Ok(())
    }

    /// Zero-state provisioning: a no-op once any key exists anywhere.
    pub async fn bootstrap_initial_admin(&self, request: BootstrapRequest) -> Result<BootstrapOutcome> {
        if self.repo.count_all_keys().await? > 0 {
            return Ok(BootstrapOutcome {
                created: false,
                tenant: None,
                key: None,
            });
        }

        let tenant = self.repo.create_tenant(&request.tenant_name).await?;
        let hash = api_key::hash_key(&request.raw_api_key);
        let key = self
            .repo
            .insert_api_key(tenant.id, &request.key_name, Role::Admin, &hash)
            .await?;

        Ok(BootstrapOutcome {
            created: true,
            tenant: Some(tenant),
            key: Some(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryRepository;

    #[tokio::test]
    async fn bootstrap_is_idempotent_once_a_key_exists() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ApiKeyService::new(repo);

        let request = || BootstrapRequest {
            tenant_name: "acme".to_string(),
            key_name: "root".to_string(),
            raw_api_key: "llk_deadbeef".to_string(),
        };

        let first = service.bootstrap_initial_admin(request()).await.unwrap();
        assert!(first.created);

        let second = service.bootstrap_initial_admin(request()).await.unwrap();
        assert!(!second.created);
    }

    #[tokio::test]
    async fn authenticate_rejects_blank_credential() {
        let service = ApiKeyService::new(Arc::new(InMemoryRepository::new()));
        let result = service.authenticate("   ").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn non_admin_cannot_create_keys() {
        let service = ApiKeyService::new(Arc::new(InMemoryRepository::new()));
        let actor = AuthContext {
            api_key_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role: Role::Service,
        };
        let result = service.create_api_key(actor, actor.tenant_id, "svc", Role::Service).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn cannot_issue_keys_for_another_tenant() {
        let service = ApiKeyService::new(Arc::new(InMemoryRepository::new()));
        let actor = AuthContext {
            api_key_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let result = service.create_api_key(actor, Uuid::new_v4(), "svc", Role::Service).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn revoking_unknown_key_is_invariant_violation() {
        let service = ApiKeyService::new(Arc::new(InMemoryRepository::new()));
        let actor = AuthContext {
            api_key_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let result = service.revoke_api_key(actor, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::InvariantViolation(_))));
    }
}
