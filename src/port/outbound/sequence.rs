//! Identifier sequence port.

use async_trait::async_trait;

use crate::error::Result;

/// Collection name for product identifiers.
pub const PRODUCTS_COLLECTION: &str = "products";

/// Collection name for order identifiers.
pub const ORDERS_COLLECTION: &str = "orders";

/// Issues monotonically increasing identifiers per logical collection.
///
/// Implementations must increment and read in one atomic step against a
/// single counter record, so concurrent callers (in this process or another)
/// never observe the same value for the same collection. The first value of
/// a fresh collection is 1.
#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    /// Return the next identifier for `collection`.
    async fn next(&self, collection: &str) -> Result<u64>;
}
