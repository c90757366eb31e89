//! Product cache port.

use async_trait::async_trait;

use crate::domain::{Product, ProductId};
use crate::error::Result;

/// Cache key for a product.
#[must_use]
pub fn product_key(id: ProductId) -> String {
    format!("product:{id}")
}

/// Advisory product cache with a fixed time-to-live.
///
/// A miss is `Ok(None)`, never an error. Content may be stale by up to the
/// TTL and must not be used for compare-and-swap decisions.
#[async_trait]
pub trait ProductCache: Send + Sync {
    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    async fn set(&self, product: &Product) -> Result<()>;

    async fn set_many(&self, products: &[Product]) -> Result<()>;

    async fn delete(&self, id: ProductId) -> Result<()>;

    /// Drop expired entries and return how many were removed. Caches that
    /// expire entries on their own keep the default.
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }
}
