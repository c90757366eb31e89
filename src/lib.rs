//! Stockflow - order fulfillment against a shared product catalog.
//!
//! Orders are validated against live catalog stock, priced, persisted, and
//! announced on a partitioned event log. A stock reconciler consumes those
//! events and decrements stock in the catalog store. Product reads go through
//! a TTL cache that the reconciler does not touch unless configured to.
//!
//! # Modules
//!
//! - [`domain`] - Products, orders, events, pagination, and their invariants
//! - [`port`] - Traits the application depends on
//! - [`adapter`] - SQLite and in-memory stores, cache, event log, and the CLI
//! - [`application`] - Catalog and order services, consumer, reconciler
//! - [`infrastructure`] - Configuration, logging, wiring, and the run loop
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use stockflow::domain::{NewProduct, OrderLine, UserId};
//! use stockflow::infrastructure::bootstrap::Services;
//! use stockflow::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> stockflow::error::Result<()> {
//! let services = Services::build(&Config::load_or_default("stockflow.toml")?)?;
//! let lamp = services
//!     .catalog
//!     .create_product(NewProduct {
//!         name: "Lamp".into(),
//!         category: "home".into(),
//!         price: "12.50".parse().unwrap(),
//!         stock: 4,
//!     })
//!     .await?;
//! services
//!     .orders
//!     .create_order(UserId::new(1), &[OrderLine::new(lamp.id, 2)])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
