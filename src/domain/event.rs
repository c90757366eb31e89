//! Domain events exchanged between the order side and the catalog side.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, UserId};
use super::order::Order;

/// Topic carrying [`OrderCreated`] events.
pub const ORDER_CREATED_TOPIC: &str = "order.created";

/// Emitted once per successfully persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderCreatedItem>,
}

/// A (product, quantity) pair to be taken out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedItem {
    pub product_id: ProductId,
    pub quantity: u64,
}

impl OrderCreated {
    /// Build the event for an order, preserving item order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            items: order
                .items
                .iter()
                .map(|item| OrderCreatedItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }

    /// Partition key; all events of one order land in one partition.
    #[must_use]
    pub fn partition_key(&self) -> String {
        self.order_id.to_string()
    }

    /// Idempotency token for the item at `index`. Repeated lines for one
    /// product get distinct tokens.
    #[must_use]
    pub fn stock_token(&self, index: usize, product_id: ProductId) -> StockToken {
        StockToken::new(self.order_id, index, product_id)
    }
}

/// Stable idempotency key for one stock decrement: one per order item,
/// not per product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StockToken(String);

impl StockToken {
    #[must_use]
    pub fn new(order_id: OrderId, index: usize, product_id: ProductId) -> Self {
        Self(format!("order-{order_id}/item-{index}/product-{product_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
