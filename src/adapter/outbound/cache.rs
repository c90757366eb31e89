//! Product cache adapters.
//!
//! Values are stored as JSON strings under `product:{id}` keys, the same
//! shape a shared key-value cache would hold. Expiry uses the tokio clock so
//! tests can advance time deterministically.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::domain::{Product, ProductId};
use crate::error::Result;
use crate::port::outbound::cache::{product_key, ProductCache};

/// Default time-to-live for cached products.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    expires_at: Instant,
}

/// Thread-safe TTL cache for products.
#[derive(Debug)]
pub struct MemoryProductCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryProductCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&self, product: &Product) -> Result<()> {
        let payload = serde_json::to_string(product)?;
        self.entries.insert(
            product_key(product.id),
            CacheEntry {
                payload,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }
}

impl Default for MemoryProductCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl ProductCache for MemoryProductCache {
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let key = product_key(id);
        let cached = self
            .entries
            .get(&key)
            .map(|entry| (entry.payload.clone(), entry.expires_at));
        let payload = match cached {
            Some((payload, expires_at)) if expires_at > Instant::now() => payload,
            Some(_) => {
                self.entries
                    .remove_if(&key, |_, entry| entry.expires_at <= Instant::now());
                return Ok(None);
            }
            None => return Ok(None),
        };
        Ok(Some(serde_json::from_str(&payload)?))
    }

    async fn set(&self, product: &Product) -> Result<()> {
        self.insert(product)
    }

    async fn set_many(&self, products: &[Product]) -> Result<()> {
        for product in products {
            self.insert(product)?;
        }
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        self.entries.remove(&product_key(id));
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        Ok(before.saturating_sub(self.entries.len()))
    }
}

/// Cache used when caching is disabled: every read misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProductCache;

#[async_trait]
impl ProductCache for NoopProductCache {
    async fn get(&self, _id: ProductId) -> Result<Option<Product>> {
        Ok(None)
    }

    async fn set(&self, _product: &Product) -> Result<()> {
        Ok(())
    }

    async fn set_many(&self, _products: &[Product]) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _id: ProductId) -> Result<()> {
        Ok(())
    }
}
