//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies: identifier
//! sequences, authoritative stores, the product cache, the event log, and the
//! synchronous catalog client used by the order side.

pub mod cache;
pub mod catalog;
pub mod catalog_client;
pub mod event;
pub mod order;
pub mod sequence;
