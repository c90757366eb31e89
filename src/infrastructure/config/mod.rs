//! Infrastructure configuration modules.

pub mod cache;
pub mod events;
pub mod logging;
pub mod orders;
pub mod settings;
