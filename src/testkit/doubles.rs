//! Test doubles for outbound ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use super::domain::product;
use crate::domain::{OrderCreated, Product, ProductId};
use crate::error::{Error, Result};
use crate::port::outbound::cache::ProductCache;
use crate::port::outbound::catalog_client::CatalogClient;
use crate::port::outbound::event::{EventLog, OrderEventPublisher, Record, RecordPosition};

/// Catalog client over a fixed product map, with an optional delay per call.
#[derive(Default)]
pub struct StubCatalog {
    pub products: Mutex<HashMap<ProductId, Product>>,
    pub delay: Option<Duration>,
}

impl StubCatalog {
    /// Catalog holding `(id, name, price, stock)` products.
    pub fn with(products: &[(u64, &str, Decimal, u64)]) -> Self {
        let map = products
            .iter()
            .map(|&(id, name, price, stock)| (ProductId::new(id), product(id, name, price, stock)))
            .collect();
        Self {
            products: Mutex::new(map),
            delay: None,
        }
    }

    pub fn set_price(&self, id: u64, price: Decimal) {
        if let Some(p) = self.products.lock().get_mut(&ProductId::new(id)) {
            p.price = price;
        }
    }

    pub fn remove(&self, id: u64) {
        self.products.lock().remove(&ProductId::new(id));
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.products
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("product", id))
    }
}

/// Publisher that keeps every event in memory, or fails when `fail` is set.
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<OrderCreated>>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn published(&self) -> Vec<OrderCreated> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl OrderEventPublisher for RecordingPublisher {
    async fn publish_order_created(&self, event: &OrderCreated) -> Result<RecordPosition> {
        if self.fail {
            return Err(Error::Connection("broker unreachable".into()));
        }
        let mut events = self.events.lock();
        events.push(event.clone());
        Ok(RecordPosition {
            partition: 0,
            offset: events.len() as u64 - 1,
        })
    }
}

/// Cache whose every operation fails with a connection error.
pub struct FailingCache;

#[async_trait]
impl ProductCache for FailingCache {
    async fn get(&self, _id: ProductId) -> Result<Option<Product>> {
        Err(Error::Connection("cache down".into()))
    }

    async fn set(&self, _product: &Product) -> Result<()> {
        Err(Error::Connection("cache down".into()))
    }

    async fn set_many(&self, _products: &[Product]) -> Result<()> {
        Err(Error::Connection("cache down".into()))
    }

    async fn delete(&self, _id: ProductId) -> Result<()> {
        Err(Error::Connection("cache down".into()))
    }
}

/// Event log wrapper that fails a scripted number of reads or commits
/// before delegating to the inner log.
pub struct FlakyEventLog {
    inner: Arc<dyn EventLog>,
    failing_reads: AtomicUsize,
    failing_commits: AtomicUsize,
}

impl FlakyEventLog {
    pub fn new(inner: Arc<dyn EventLog>) -> Self {
        Self {
            inner,
            failing_reads: AtomicUsize::new(0),
            failing_commits: AtomicUsize::new(0),
        }
    }

    /// Fail the next `n` calls to `read`.
    pub fn fail_reads(&self, n: usize) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` calls to `commit`.
    pub fn fail_commits(&self, n: usize) {
        self.failing_commits.store(n, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EventLog for FlakyEventLog {
    fn partitions(&self) -> u32 {
        self.inner.partitions()
    }

    async fn append(&self, topic: &str, key: &str, payload: &[u8]) -> Result<RecordPosition> {
        self.inner.append(topic, key, payload).await
    }

    async fn read(&self, topic: &str, partition: u32, from: u64, max: usize) -> Result<Vec<Record>> {
        if Self::take_failure(&self.failing_reads) {
            return Err(Error::Connection("event log busy".into()));
        }
        self.inner.read(topic, partition, from, max).await
    }

    async fn committed(&self, group: &str, topic: &str, partition: u32) -> Result<u64> {
        self.inner.committed(group, topic, partition).await
    }

    async fn commit(&self, group: &str, topic: &str, partition: u32, next_offset: u64) -> Result<()> {
        if Self::take_failure(&self.failing_commits) {
            return Err(Error::Connection("event log busy".into()));
        }
        self.inner.commit(group, topic, partition, next_offset).await
    }
}
