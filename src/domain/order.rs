//! Orders, their items, and the status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OrderId, ProductId, UserId};
use super::money::{checked_sum, line_total, Price};
use super::product::Product;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Forward transitions allowed under [`TransitionPolicy::Strict`].
    #[must_use]
    pub const fn can_advance_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid)
                | (Self::Pending, Self::Cancelled)
                | (Self::Paid, Self::Shipped)
                | (Self::Paid, Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// How status updates are checked.
///
/// `Permissive` overwrites the status unconditionally, so every status is
/// reachable from every other one. `Strict` only allows the forward moves in
/// [`OrderStatus::can_advance_to`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn check(self, from: OrderStatus, to: OrderStatus) -> Result<(), DomainError> {
        match self {
            Self::Permissive => Ok(()),
            Self::Strict if from.can_advance_to(to) => Ok(()),
            Self::Strict => Err(DomainError::InvalidTransition { from, to }),
        }
    }
}

/// Which prices an order read reports.
///
/// `Current` re-prices every item from the live catalog and recomputes the
/// total, so reads drift from what was charged. `Snapshot` returns the values
/// captured at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPricing {
    #[default]
    Current,
    Snapshot,
}

/// A requested order line, before validation and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderLine {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// Positive quantity or [`DomainError::InvalidQuantity`].
    pub fn checked_quantity(&self) -> Result<u64, DomainError> {
        match u64::try_from(self.quantity) {
            Ok(q) if q > 0 => Ok(q),
            _ => Err(DomainError::InvalidQuantity {
                product_id: self.product_id,
                quantity: self.quantity,
            }),
        }
    }
}

/// One priced line of an order with a name/price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u64,
    pub total_price: Price,
}

impl OrderItem {
    /// Price `quantity` units of `product` at its current catalog price.
    pub fn priced(product: &Product, quantity: u64) -> Result<Self, DomainError> {
        Ok(Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            total_price: line_total(product.price, quantity)?,
        })
    }

    /// Refresh name and price from the product, keeping the quantity.
    /// The item is left untouched when the new total overflows.
    pub fn reprice(&mut self, product: &Product) -> Result<(), DomainError> {
        let total_price = line_total(product.price, self.quantity)?;
        self.name.clone_from(&product.name);
        self.price = product.price;
        self.total_price = total_price;
        Ok(())
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// New pending order; the total is the sum of the item totals.
    pub fn pending(
        id: OrderId,
        user_id: UserId,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let total_amount = items_total(&items)?;
        Ok(Self {
            id,
            user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Recompute `total_amount` from the current items.
    pub fn recompute_total(&mut self) -> Result<(), DomainError> {
        self.total_amount = items_total(&self.items)?;
        Ok(())
    }
}

fn items_total(items: &[OrderItem]) -> Result<Price, DomainError> {
    checked_sum(items.iter().map(|i| i.total_price))
}

/// Equality predicates over orders. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub id: Option<OrderId>,
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    #[must_use]
    pub fn by_id(id: OrderId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.id.map_or(true, |id| order.id == id)
            && self.user_id.map_or(true, |u| order.user_id == u)
            && self.status.map_or(true, |s| order.status == s)
    }
}

/// Partial order update. Totals are never part of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderUpdate {
    pub fn apply(&self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(updated_at) = self.updated_at {
            order.updated_at = updated_at;
        }
    }
}
