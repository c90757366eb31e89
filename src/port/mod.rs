//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  Catalog / Order /      │
//!     ┌──────────────┤  Reconciler services    ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Cache  │            │   Stores    │              │ Event log │
//! │ Adapter │            │  Adapters   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! Only outbound (driven) ports exist; the CLI drives the application
//! services directly.

pub mod outbound;
