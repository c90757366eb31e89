//! Outbound adapters (driven side).

pub mod cache;
pub mod catalog_client;
pub mod codec;
pub mod memory;
pub mod publisher;
pub mod sqlite;
