//! Event channel ports: the partitioned log and the order event publisher.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::OrderCreated;
use crate::error::Result;

/// Where an appended record landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPosition {
    pub partition: u32,
    pub offset: u64,
}

/// A record read back from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub partition: u32,
    pub offset: u64,
    pub key: String,
    pub payload: Vec<u8>,
    pub appended_at: DateTime<Utc>,
}

/// Durable append-only log, ordered within each partition.
///
/// Offsets start at 0 and are dense per (topic, partition). Consumer groups
/// store the next offset they want to read.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Number of partitions per topic.
    fn partitions(&self) -> u32;

    /// Append a record. The partition is derived from `key`.
    async fn append(&self, topic: &str, key: &str, payload: &[u8]) -> Result<RecordPosition>;

    /// Up to `max` records starting at offset `from`.
    async fn read(&self, topic: &str, partition: u32, from: u64, max: usize)
        -> Result<Vec<Record>>;

    /// Next offset the group should consume; 0 when nothing was committed.
    async fn committed(&self, group: &str, topic: &str, partition: u32) -> Result<u64>;

    /// Record that the group has processed everything below `next_offset`.
    async fn commit(&self, group: &str, topic: &str, partition: u32, next_offset: u64)
        -> Result<()>;
}

/// Publishes order-created events after the order is persisted.
#[async_trait]
pub trait OrderEventPublisher: Send + Sync {
    async fn publish_order_created(&self, event: &OrderCreated) -> Result<RecordPosition>;
}

/// Binary encoding of order events on the log.
pub trait OrderEventCodec: Send + Sync {
    fn encode(&self, event: &OrderCreated) -> Result<Vec<u8>>;

    fn decode(&self, payload: &[u8]) -> Result<OrderCreated>;
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Partition for `key`: 32-bit FNV-1a hash modulo the partition count.
#[must_use]
pub fn partition_for(key: &str, partitions: u32) -> u32 {
    let hash = key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    });
    hash % partitions.max(1)
}
