//! Per-identity expense ledger: dated, categorized records persisted as full
//! snapshots to a key-value store, with pure aggregation read models for
//! tables and charts. "Logging in" selects a storage partition; there is no
//! authentication and no server.

mod aggregate;
mod identity;
mod record;
mod session;
mod storage;

pub use aggregate::{scatter_series, totals_by_category, totals_by_date, ScatterPoint};
pub use identity::{Identity, IdentityError};
pub use record::{ExpenseRecord, RecordDraft, ValidationError};
pub use session::{Session, SessionError};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
