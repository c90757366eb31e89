//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod catalog;
pub mod consumer;
pub mod order;
pub mod reconciler;
