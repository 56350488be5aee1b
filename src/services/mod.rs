pub mod api_key_service;
pub mod ledger_service;
pub mod posting_service;
pub mod read_service;

pub use api_key_service::{ApiKeyService, AuthContext, BootstrapOutcome, BootstrapRequest, CreatedApiKey};
pub use ledger_service::LedgerService;
pub use posting_service::{PostTransactionRequest, PostingLine, PostingService};
pub use read_service::ReadService;
