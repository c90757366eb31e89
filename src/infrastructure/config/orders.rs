//! Order orchestration and stock reconciliation settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::order::OrderSettings;
use crate::application::reconciler::ReconcilerSettings;
use crate::domain::{ReadPricing, TransitionPolicy};

/// `[orders]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrdersConfig {
    /// Deadline for each catalog lookup during order creation (default: 30000).
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
    /// `permissive` allows any status change, `strict` enforces the lifecycle.
    #[serde(default)]
    pub transitions: TransitionPolicy,
    /// `current` reprices items on read, `snapshot` returns stored values.
    #[serde(default)]
    pub read_pricing: ReadPricing,
}

fn default_rpc_timeout_ms() -> u64 {
    30_000
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_ms: default_rpc_timeout_ms(),
            transitions: TransitionPolicy::default(),
            read_pricing: ReadPricing::default(),
        }
    }
}

impl OrdersConfig {
    #[must_use]
    pub fn settings(&self) -> OrderSettings {
        OrderSettings {
            rpc_timeout: Duration::from_millis(self.rpc_timeout_ms),
            transitions: self.transitions,
            read_pricing: self.read_pricing,
        }
    }
}

/// `[reconciler]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Record an idempotency token per (order, product) decrement.
    pub idempotent: bool,
    /// Delete cached products after the reconciler changes their stock.
    pub invalidate_cache: bool,
}

impl ReconcilerConfig {
    #[must_use]
    pub fn settings(&self, poll_interval: Duration) -> ReconcilerSettings {
        ReconcilerSettings {
            idempotent: self.idempotent,
            invalidate_cache: self.invalidate_cache,
            poll_interval,
        }
    }
}
