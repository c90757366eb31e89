//! SQLite persistence adapters.
//!
//! Durable implementations of the sequence, catalog, order, and event log
//! ports using Diesel ORM. Every call runs on the blocking thread pool via
//! [`database::connection::interact`].

pub mod catalog;
pub mod database;
pub mod event_log;
pub mod order;
pub mod sequence;

pub use catalog::SqliteCatalogStore;
pub use event_log::SqliteEventLog;
pub use order::SqliteOrderStore;
pub use sequence::SqliteSequence;
