//! Consumer group member over the event log.
//!
//! Partitions are assigned statically: member `i` of `n` owns every
//! partition `p` with `p % n == i`. The fetch position per partition lives in
//! memory, starts at the group's committed offset, and only moves when a
//! record is committed. A record whose processing or commit failed is
//! fetched again by the next poll, in this process or after a restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::port::outbound::event::{EventLog, Record};

/// Group membership and batching for an [`EventConsumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerSettings {
    pub group: String,
    pub topic: String,
    pub member_index: u32,
    pub members: u32,
    /// Maximum records returned by one poll.
    pub batch_size: usize,
}

/// One member of a consumer group.
pub struct EventConsumer {
    log: Arc<dyn EventLog>,
    settings: ConsumerSettings,
    positions: BTreeMap<u32, u64>,
}

impl EventConsumer {
    /// Join the group and seed fetch positions from committed offsets.
    pub async fn subscribe(log: Arc<dyn EventLog>, settings: ConsumerSettings) -> Result<Self> {
        let members = settings.members.max(1);
        let mut positions = BTreeMap::new();
        for partition in (0..log.partitions()).filter(|p| p % members == settings.member_index) {
            let committed = log
                .committed(&settings.group, &settings.topic, partition)
                .await?;
            positions.insert(partition, committed);
        }
        debug!(
            group = %settings.group,
            topic = %settings.topic,
            partitions = ?positions.keys().collect::<Vec<_>>(),
            "Consumer subscribed"
        );
        Ok(Self {
            log,
            settings,
            positions,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ConsumerSettings {
        &self.settings
    }

    /// Partitions owned by this member.
    #[must_use]
    pub fn assignment(&self) -> Vec<u32> {
        self.positions.keys().copied().collect()
    }

    /// Fetch the next batch of uncommitted records across owned partitions.
    /// Records within a partition keep log order.
    ///
    /// Polling again without committing returns the same records.
    pub async fn poll(&self) -> Result<Vec<Record>> {
        let mut batch = Vec::new();
        for (&partition, &position) in &self.positions {
            let room = self.settings.batch_size.saturating_sub(batch.len());
            if room == 0 {
                break;
            }
            let records = self
                .log
                .read(&self.settings.topic, partition, position, room)
                .await?;
            batch.extend(records);
        }
        Ok(batch)
    }

    /// Mark `record` as processed for the group and move past it.
    ///
    /// The fetch position is left alone when the commit fails.
    pub async fn commit(&mut self, record: &Record) -> Result<()> {
        let next_offset = record.offset + 1;
        self.log
            .commit(
                &self.settings.group,
                &self.settings.topic,
                record.partition,
                next_offset,
            )
            .await?;
        if let Some(position) = self.positions.get_mut(&record.partition) {
            *position = (*position).max(next_offset);
        }
        Ok(())
    }
}
