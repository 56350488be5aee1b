pub mod account;
pub mod api_key;
pub mod cursor;
pub mod entry;
pub mod ledger;
pub mod tenant;
pub mod transaction;

pub use account::{Account, NormalBalance};
pub use api_key::{ApiKey, Role};
pub use cursor::Cursor;
pub use entry::{Direction, Entry};
pub use ledger::Ledger;
pub use tenant::Tenant;
pub use transaction::Transaction;
