//! Event log and consumer group configuration.

use serde::{Deserialize, Serialize};

use crate::domain::ORDER_CREATED_TOPIC;

/// Event channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EventsConfig {
    /// Topic order events are published to.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Partitions per topic; records are routed by order id.
    #[serde(default = "default_partitions")]
    pub partitions: u32,
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
    /// This process's index within the consumer group.
    #[serde(default)]
    pub member_index: u32,
    /// Number of members in the consumer group.
    #[serde(default = "default_members")]
    pub members: u32,
    /// Idle sleep between empty polls (default: 500).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_topic() -> String {
    ORDER_CREATED_TOPIC.to_string()
}

fn default_partitions() -> u32 {
    3
}

fn default_consumer_group() -> String {
    "inventory-consumer-group".to_string()
}

fn default_members() -> u32 {
    1
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_batch_size() -> usize {
    64
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            partitions: default_partitions(),
            consumer_group: default_consumer_group(),
            member_index: 0,
            members: default_members(),
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
        }
    }
}
