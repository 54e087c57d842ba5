//! Run-scoped holding area for records between parsing and reporting.

mod memory;
mod sqlite;

pub use memory::MemoryStagingStore;
pub use sqlite::SqliteStagingStore;

use crate::{errors::RunResult, types::Record};

/// Durable store owned by exactly one run at a time.
///
/// Every failure is `RunError::StagingUnavailable`.
pub trait StagingStore {
    /// Removes every staged record. Clearing an empty store succeeds.
    fn clear(&mut self) -> RunResult<()>;

    /// Persists one batch. Either the whole batch becomes visible or none of it does.
    fn append(&mut self, records: &[Record]) -> RunResult<()>;

    /// Every staged record, in no particular order.
    fn read_all(&self) -> RunResult<Vec<Record>>;
}
