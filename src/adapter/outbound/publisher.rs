//! Publishes order events onto the event log.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::codec::MessagePackCodec;
use crate::domain::OrderCreated;
use crate::error::Result;
use crate::port::outbound::event::{
    EventLog, OrderEventCodec, OrderEventPublisher, RecordPosition,
};

/// Encodes [`OrderCreated`] events and appends them keyed by order id.
pub struct LogOrderPublisher {
    log: Arc<dyn EventLog>,
    codec: Arc<dyn OrderEventCodec>,
    topic: String,
}

impl LogOrderPublisher {
    /// Publisher using the MessagePack codec.
    pub fn new(log: Arc<dyn EventLog>, topic: impl Into<String>) -> Self {
        Self::with_codec(log, Arc::new(MessagePackCodec), topic)
    }

    pub fn with_codec(
        log: Arc<dyn EventLog>,
        codec: Arc<dyn OrderEventCodec>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            log,
            codec,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl OrderEventPublisher for LogOrderPublisher {
    async fn publish_order_created(&self, event: &OrderCreated) -> Result<RecordPosition> {
        let payload = self.codec.encode(event)?;
        let position = self
            .log
            .append(&self.topic, &event.partition_key(), &payload)
            .await?;
        debug!(
            topic = %self.topic,
            order_id = %event.order_id,
            partition = position.partition,
            offset = position.offset,
            "Order event appended"
        );
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryEventLog;
    use crate::domain::{OrderCreatedItem, OrderId, ProductId, UserId, ORDER_CREATED_TOPIC};

    #[tokio::test]
    async fn appends_encoded_event_under_order_key() {
        let log = Arc::new(MemoryEventLog::new(3));
        let publisher = LogOrderPublisher::new(log.clone(), ORDER_CREATED_TOPIC);
        let event = OrderCreated {
            order_id: OrderId::new(12),
            user_id: UserId::new(1),
            items: vec![OrderCreatedItem {
                product_id: ProductId::new(5),
                quantity: 2,
            }],
        };

        let position = publisher.publish_order_created(&event).await.unwrap();
        let records = log
            .read(ORDER_CREATED_TOPIC, position.partition, position.offset, 1)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "12");
        assert_eq!(MessagePackCodec.decode(&records[0].payload).unwrap(), event);
    }
}
