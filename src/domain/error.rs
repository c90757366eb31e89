//! Domain validation errors for core domain types.
//!
//! These errors are returned when a request violates a domain rule before any
//! side effect takes place. They all classify as invalid arguments.
//!
//! # Examples
//!
//! ```
//! use stockflow::domain::error::DomainError;
//! use stockflow::domain::page::PageRequest;
//!
//! let result = PageRequest::new(0, 10);
//! assert!(matches!(result, Err(DomainError::InvalidPage { page: 0, .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use super::id::ProductId;
use super::order::OrderStatus;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An order line asked for zero or fewer units.
    #[error("invalid quantity {quantity} for product {product_id}, must be a positive amount")]
    InvalidQuantity {
        /// Product the line refers to.
        product_id: ProductId,
        /// The rejected quantity.
        quantity: i64,
    },

    /// Orders must contain at least one line.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Prices cannot be negative.
    #[error("price must not be negative, got {price}")]
    NegativePrice {
        /// The rejected price.
        price: Decimal,
    },

    /// Products need a name.
    #[error("product name cannot be empty")]
    EmptyName,

    /// Pagination starts at page 1 and needs a positive limit.
    #[error("invalid page {page} with limit {limit}: both must be at least 1")]
    InvalidPage {
        /// Requested page.
        page: u64,
        /// Requested limit.
        limit: u64,
    },

    /// Status string did not name a known order status.
    #[error("unknown order status '{0}'")]
    UnknownStatus(String),

    /// Status change rejected by the strict transition policy.
    #[error("order status cannot change from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Update carried no fields to write.
    #[error("update contains no fields")]
    EmptyUpdate,

    /// A line or order total does not fit in a decimal.
    #[error("amount overflow: {0}")]
    AmountOverflow(String),
}
