use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

const KEY_PREFIX: &str = "llk_";

/// Caller role, used both to gate admin-only operations and to scope what an
/// authenticated caller can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Service,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "SERVICE" => Some(Role::Service),
            _ => None,
        }
    }
}

/// A stored API key. Only the SHA-256 hex digest of the raw key is ever
/// persisted; the raw value is returned to the caller exactly once, at
/// creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApiKey {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub role: Role,
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// Generates a new raw key (`llk_` + 64 hex characters from 32 random bytes)
/// together with its SHA-256 hex digest.
pub fn generate_raw_key() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = format!("{KEY_PREFIX}{}", hex::encode(bytes));
    let hash = hash_key(&raw);
    (raw, hash)
}

/// Hashes a raw key for lookup/storage. Trims surrounding whitespace first
/// so a client that copy-pasted a trailing newline still authenticates.
pub fn hash_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.trim().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_expected_shape() {
        let (raw, hash) = generate_raw_key();
        assert!(raw.starts_with(KEY_PREFIX));
        assert_eq!(raw.len(), KEY_PREFIX.len() + 64);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash_key(&raw), hash);
    }

    #[test]
    fn hash_is_stable_and_trims_whitespace() {
        let (raw, hash) = generate_raw_key();
        assert_eq!(hash_key(&format!("  {raw}\n")), hash);
    }

    #[test]
    fn two_generated_keys_differ() {
        let (raw_a, _) = generate_raw_key();
        let (raw_b, _) = generate_raw_key();
        assert_ne!(raw_a, raw_b);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("SERVICE"), Some(Role::Service));
        assert_eq!(Role::parse("bogus"), None);
    }
}
