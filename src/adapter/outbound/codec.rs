//! MessagePack encoding of order events.
//!
//! Fields are written with their names (`to_vec_named`) so the payload is a
//! map `{order_id, user_id, items: [{product_id, quantity}]}` and stays
//! readable by consumers that ignore unknown fields.

use crate::domain::OrderCreated;
use crate::error::{Error, Result};
use crate::port::outbound::event::OrderEventCodec;

/// [`OrderEventCodec`] backed by `rmp-serde`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessagePackCodec;

impl OrderEventCodec for MessagePackCodec {
    fn encode(&self, event: &OrderCreated) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(event)
            .map_err(|e| Error::Codec(format!("failed to encode order event: {e}")))
    }

    fn decode(&self, payload: &[u8]) -> Result<OrderCreated> {
        rmp_serde::from_slice(payload)
            .map_err(|e| Error::Codec(format!("failed to decode order event: {e}")))
    }
}
