//! Catalog product entity, filters, and partial updates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::ProductId;
use super::money::Price;

/// A catalog product. Stock is owned by the catalog store and only ever
/// changed through its write operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a product; id and timestamps are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub stock: u64,
}

impl NewProduct {
    /// Check name and price before anything is written.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyName);
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::NegativePrice { price: self.price });
        }
        Ok(())
    }

    /// Materialize the product with its assigned id and creation time.
    #[must_use]
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Equality predicates over products. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub id: Option<ProductId>,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl ProductFilter {
    /// Filter matching a single product id.
    #[must_use]
    pub fn by_id(id: ProductId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Filter matching a category.
    #[must_use]
    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.id.map_or(true, |id| product.id == id)
            && self.name.as_ref().map_or(true, |n| &product.name == n)
            && self
                .category
                .as_ref()
                .map_or(true, |c| &product.category == c)
    }
}

/// Partial product update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductUpdate {
    /// Reject negative prices, empty names, and updates with nothing to change.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
        {
            return Err(DomainError::EmptyUpdate);
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::EmptyName);
            }
        }
        if let Some(price) = self.price {
            if price < Decimal::ZERO {
                return Err(DomainError::NegativePrice { price });
            }
        }
        Ok(())
    }

    /// Apply the present fields onto a product in place.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(updated_at) = self.updated_at {
            product.updated_at = updated_at;
        }
    }
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// Stock was decremented; `remaining` is the new level.
    Applied { remaining: u64 },
    /// The idempotency token was already recorded; nothing changed.
    Duplicate,
}
