use serde::Deserialize;
use uuid::Uuid;

use crate::models::{Direction, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLedgerRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub ledger_id: Uuid,
    pub name: String,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostEntryRequest {
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostTransactionRequest {
    pub ledger_id: Uuid,
    pub reference: String,
    pub currency: String,
    pub entries: Vec<PostEntryRequest>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapRequest {
    pub tenant_name: String,
    pub key_name: String,
    pub raw_api_key: String,
}
