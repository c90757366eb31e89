//! In-memory order store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Order, OrderFilter, OrderId, OrderUpdate, Page, PageRequest};
use crate::error::{Error, Result};
use crate::port::outbound::order::OrderStore;

/// Orders ordered by id behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(filter: &OrderFilter) -> Error {
    match filter.id {
        Some(id) => Error::not_found("order", id),
        None => Error::not_found("order", format!("{filter:?}")),
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write();
        if orders.contains_key(&order.id) {
            return Err(Error::AlreadyExists {
                entity: "order",
                key: order.id.to_string(),
            });
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get(&self, filter: &OrderFilter) -> Result<Order> {
        self.orders
            .read()
            .values()
            .find(|o| filter.matches(o))
            .cloned()
            .ok_or_else(|| missing(filter))
    }

    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
        let orders = self.orders.read();
        let matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        Ok(Page::new(page.window(&matching), total, page))
    }

    async fn update(&self, filter: &OrderFilter, update: &OrderUpdate) -> Result<Order> {
        let mut orders = self.orders.write();
        let order = orders
            .values_mut()
            .find(|o| filter.matches(o))
            .ok_or_else(|| missing(filter))?;
        update.apply(order);
        Ok(order.clone())
    }

    async fn delete(&self, filter: &OrderFilter) -> Result<()> {
        let mut orders = self.orders.write();
        let id = orders
            .values()
            .find(|o| filter.matches(o))
            .map(|o| o.id)
            .ok_or_else(|| missing(filter))?;
        orders.remove(&id);
        Ok(())
    }
}
