//! In-memory event log.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::Result;
use crate::port::outbound::event::{partition_for, EventLog, Record, RecordPosition};

type OffsetKey = (String, String, u32);

/// Per-topic partition vectors plus committed group offsets.
///
/// A record's offset is its index in the partition vector.
#[derive(Debug)]
pub struct MemoryEventLog {
    partitions: u32,
    topics: RwLock<HashMap<String, Vec<Vec<Record>>>>,
    offsets: RwLock<HashMap<OffsetKey, u64>>,
}

impl MemoryEventLog {
    #[must_use]
    pub fn new(partitions: u32) -> Self {
        Self {
            partitions: partitions.max(1),
            topics: RwLock::new(HashMap::new()),
            offsets: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of records appended to `topic` across partitions.
    #[must_use]
    pub fn len(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map_or(0, |parts| parts.iter().map(Vec::len).sum())
    }

    #[must_use]
    pub fn is_empty(&self, topic: &str) -> bool {
        self.len(topic) == 0
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    fn partitions(&self) -> u32 {
        self.partitions
    }

    async fn append(&self, topic: &str, key: &str, payload: &[u8]) -> Result<RecordPosition> {
        let partition = partition_for(key, self.partitions);
        let mut topics = self.topics.write();
        let parts = topics
            .entry(topic.to_owned())
            .or_insert_with(|| vec![Vec::new(); self.partitions as usize]);
        let records = &mut parts[partition as usize];
        let offset = records.len() as u64;
        records.push(Record {
            partition,
            offset,
            key: key.to_owned(),
            payload: payload.to_vec(),
            appended_at: Utc::now(),
        });
        Ok(RecordPosition { partition, offset })
    }

    async fn read(
        &self,
        topic: &str,
        partition: u32,
        from: u64,
        max: usize,
    ) -> Result<Vec<Record>> {
        let topics = self.topics.read();
        let Some(records) = topics
            .get(topic)
            .and_then(|parts| parts.get(partition as usize))
        else {
            return Ok(Vec::new());
        };
        let start = usize::try_from(from).unwrap_or(usize::MAX);
        Ok(records.iter().skip(start).take(max).cloned().collect())
    }

    async fn committed(&self, group: &str, topic: &str, partition: u32) -> Result<u64> {
        let key = (group.to_owned(), topic.to_owned(), partition);
        Ok(self.offsets.read().get(&key).copied().unwrap_or(0))
    }

    async fn commit(
        &self,
        group: &str,
        topic: &str,
        partition: u32,
        next_offset: u64,
    ) -> Result<()> {
        self.offsets
            .write()
            .insert((group.to_owned(), topic.to_owned(), partition), next_offset);
        Ok(())
    }
}
