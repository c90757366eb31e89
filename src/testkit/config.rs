//! Canonical test configurations.

use crate::infrastructure::config::settings::{Config, Storage};

/// In-memory storage with a short poll interval.
pub fn memory_config() -> Config {
    let mut config = Config {
        storage: Storage::Memory,
        ..Config::default()
    };
    config.events.poll_interval_ms = 10;
    config
}

/// SQLite storage at `database`.
pub fn sqlite_config(database: &str) -> Config {
    let mut config = Config {
        storage: Storage::Sqlite,
        database: database.to_string(),
        ..Config::default()
    };
    config.events.poll_interval_ms = 10;
    config
}
