//! Stock reconciler: applies order-created events to catalog stock.
//!
//! Delivery is at-least-once. Each record is processed and then its offset
//! is committed, so a crash between the two replays the record. Without
//! idempotency tokens a replay decrements stock again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::consumer::EventConsumer;
use crate::domain::StockAdjustment;
use crate::error::Result;
use crate::port::outbound::cache::ProductCache;
use crate::port::outbound::catalog::CatalogStore;
use crate::port::outbound::event::{OrderEventCodec, Record};

/// Reconciler behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Pass a per-(order, product) token so replays are no-ops.
    pub idempotent: bool,
    /// Drop cached products after their stock changes.
    pub invalidate_cache: bool,
    /// Sleep between empty polls.
    pub poll_interval: Duration,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            idempotent: false,
            invalidate_cache: false,
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Counters for one or more processed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records processed and committed.
    pub records: usize,
    /// Records that could not be decoded and were skipped.
    pub skipped: usize,
    pub applied: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl ReconcileReport {
    fn absorb(&mut self, other: ReconcileReport) {
        self.records += other.records;
        self.skipped += other.skipped;
        self.applied += other.applied;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
    }
}

/// Consumes order events and decrements stock in the catalog store,
/// bypassing the cache.
pub struct StockReconciler {
    store: Arc<dyn CatalogStore>,
    cache: Arc<dyn ProductCache>,
    codec: Arc<dyn OrderEventCodec>,
    consumer: EventConsumer,
    settings: ReconcilerSettings,
}

impl StockReconciler {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: Arc<dyn ProductCache>,
        codec: Arc<dyn OrderEventCodec>,
        consumer: EventConsumer,
        settings: ReconcilerSettings,
    ) -> Self {
        Self {
            store,
            cache,
            codec,
            consumer,
            settings,
        }
    }

    /// Apply one record's items. Never fails: every problem is logged and
    /// counted so the caller can commit and move on.
    pub async fn process_record(&self, record: &Record) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let event = match self.codec.decode(&record.payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    partition = record.partition,
                    offset = record.offset,
                    error = %e,
                    "Skipping undecodable order event"
                );
                report.skipped += 1;
                return report;
            }
        };

        for (index, item) in event.items.iter().enumerate() {
            let token = self
                .settings
                .idempotent
                .then(|| event.stock_token(index, item.product_id));
            match self
                .store
                .decrement_stock(item.product_id, item.quantity, token.as_ref())
                .await
            {
                Ok(StockAdjustment::Applied { remaining }) => {
                    info!(
                        order_id = %event.order_id,
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        remaining,
                        "Stock decremented"
                    );
                    report.applied += 1;
                    if self.settings.invalidate_cache {
                        if let Err(e) = self.cache.delete(item.product_id).await {
                            warn!(product_id = %item.product_id, error = %e, "Cache invalidation failed");
                        }
                    }
                }
                Ok(StockAdjustment::Duplicate) => {
                    debug!(
                        order_id = %event.order_id,
                        product_id = %item.product_id,
                        "Stock decrement already applied"
                    );
                    report.duplicates += 1;
                }
                Err(e) => {
                    error!(
                        order_id = %event.order_id,
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        error = %e,
                        "Stock decrement failed"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Fetch one batch, process and commit each record.
    pub async fn poll_once(&mut self) -> Result<ReconcileReport> {
        self.drain(|| false).await
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The flag is checked between records, so a record that has started
    /// processing is always committed before the loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            group = %self.consumer.settings().group,
            topic = %self.consumer.settings().topic,
            partitions = ?self.consumer.assignment(),
            idempotent = self.settings.idempotent,
            "Stock reconciler started"
        );

        let mut total = ReconcileReport::default();
        loop {
            if *shutdown.borrow() {
                break;
            }

            let result = {
                let stop = || *shutdown.borrow();
                self.drain(stop).await
            };
            match result {
                Ok(report) if report.records > 0 => {
                    total.absorb(report);
                    continue;
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "Reconciler poll failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(
            records = total.records,
            applied = total.applied,
            failed = total.failed,
            "Stock reconciler stopped"
        );
        Ok(())
    }

    async fn drain(&mut self, stop: impl Fn() -> bool) -> Result<ReconcileReport> {
        let records = self.consumer.poll().await?;
        let mut report = ReconcileReport::default();
        for record in &records {
            if stop() {
                break;
            }
            let outcome = self.process_record(record).await;
            self.consumer.commit(record).await?;
            report.absorb(outcome);
            report.records += 1;
        }
        Ok(report)
    }
}
