//! Storage-agnostic domain types: products, orders, events, pagination.
//!
//! Nothing in here performs I/O. Invariants that can be checked locally
//! (positive quantities, non-negative prices, status transitions) are
//! enforced by the types themselves and reported as [`error::DomainError`].

pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod order;
pub mod page;
pub mod product;

pub use event::{OrderCreated, OrderCreatedItem, StockToken, ORDER_CREATED_TOPIC};
pub use id::{OrderId, ProductId, UserId};
pub use money::Price;
pub use order::{
    Order, OrderFilter, OrderItem, OrderLine, OrderStatus, OrderUpdate, ReadPricing,
    TransitionPolicy,
};
pub use page::{Page, PageRequest};
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate, StockAdjustment};
