//! Opaque cursor protocol for paged listings (spec.md §4.4).
//!
//! Encoding is base64url of the JSON object `{"created_at", "id"}`. Decoding
//! failure of any kind (bad base64, bad JSON, missing field, unparseable
//! date) is a caller error: `InvariantViolation`, never a 500.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("Cursor always serializes");
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| AppError::invariant("invalid cursor encoding"))?;
        serde_json::from_slice(&bytes).map_err(|_| AppError::invariant("invalid cursor payload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let cursor = Cursor::new(Utc::now(), Uuid::new_v4());
        let encoded = cursor.encode();
        let decoded = Cursor::decode(&encoded).unwrap();
        assert_eq!(cursor, decoded);
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(Cursor::decode("not base64!!!").is_err());
    }

    #[test]
    fn rejects_valid_base64_bad_json() {
        let encoded = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(Cursor::decode(&encoded).is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        let encoded = URL_SAFE_NO_PAD.encode(br#"{"created_at":"2024-01-01T00:00:00Z"}"#);
        assert!(Cursor::decode(&encoded).is_err());
    }
}
