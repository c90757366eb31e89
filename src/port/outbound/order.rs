//! Order store port.

use async_trait::async_trait;

use crate::domain::{Order, OrderFilter, OrderUpdate, Page, PageRequest};
use crate::error::Result;

/// Authoritative order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order. Fails with `AlreadyExists` when the id is taken.
    async fn create(&self, order: &Order) -> Result<()>;

    /// First order matching the filter (ascending id), or `NotFound`.
    async fn get(&self, filter: &OrderFilter) -> Result<Order>;

    /// One page of matching orders sorted by id, plus the total count.
    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>>;

    /// Apply the update to the first match and return the new state.
    async fn update(&self, filter: &OrderFilter, update: &OrderUpdate) -> Result<Order>;

    /// Remove the first match. Fails with `NotFound` when nothing was removed.
    async fn delete(&self, filter: &OrderFilter) -> Result<()>;
}
