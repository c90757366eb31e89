//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for products, order lines, and events.
//! - [`doubles`] - Port stand-ins: a scripted catalog client, a recording
//!   publisher, a cache that always fails, and an event log that fails on cue.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod doubles;
