//! In-memory adapters for tests and single-process runs.
//!
//! These keep the same contracts as the SQLite adapters (atomic counters,
//! conditional decrements, dense partition offsets) but lose everything on
//! restart.

pub mod catalog;
pub mod event_log;
pub mod order;
pub mod sequence;

pub use catalog::MemoryCatalogStore;
pub use event_log::MemoryEventLog;
pub use order::MemoryOrderStore;
pub use sequence::MemorySequence;
