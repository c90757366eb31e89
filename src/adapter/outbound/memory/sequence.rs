//! In-memory sequence generator.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::port::outbound::sequence::SequenceGenerator;

/// Per-collection counters in a sharded concurrent map.
///
/// The entry guard holds the shard lock across the increment and the read.
#[derive(Debug, Default)]
pub struct MemorySequence {
    counters: DashMap<String, u64>,
}

impl MemorySequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceGenerator for MemorySequence {
    async fn next(&self, collection: &str) -> Result<u64> {
        let mut counter = self.counters.entry(collection.to_owned()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
