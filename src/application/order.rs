//! Order orchestration: validation against live catalog state, pricing,
//! persistence, and event publication.
//!
//! # Create flow
//!
//! ```text
//! lines ──validate──> catalog.get_product (deadline) ──stock check──>
//!   price snapshot ──> sequence.next("orders") ──> store.create ──> publish
//! ```
//!
//! Each step runs only if the previous one succeeded. The stock check is not
//! a reservation: stock is only decremented later by the reconciler, so two
//! concurrent orders can both pass the check against the same units.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::error::DomainError;
use crate::domain::money::checked_sum;
use crate::domain::{
    Order, OrderCreated, OrderFilter, OrderId, OrderItem, OrderLine, OrderStatus, OrderUpdate,
    Page, PageRequest, Product, ProductId, ReadPricing, TransitionPolicy, UserId,
};
use crate::error::{Error, ErrorKind, Result};
use crate::port::outbound::catalog_client::CatalogClient;
use crate::port::outbound::event::OrderEventPublisher;
use crate::port::outbound::order::OrderStore;
use crate::port::outbound::sequence::{SequenceGenerator, ORDERS_COLLECTION};

/// Behaviour switches for [`OrderService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSettings {
    /// Deadline for each catalog call.
    pub rpc_timeout: Duration,
    pub transitions: TransitionPolicy,
    pub read_pricing: ReadPricing,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(30),
            transitions: TransitionPolicy::default(),
            read_pricing: ReadPricing::default(),
        }
    }
}

/// The order orchestrator.
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogClient>,
    sequence: Arc<dyn SequenceGenerator>,
    publisher: Arc<dyn OrderEventPublisher>,
    settings: OrderSettings,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogClient>,
        sequence: Arc<dyn SequenceGenerator>,
        publisher: Arc<dyn OrderEventPublisher>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            sequence,
            publisher,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> OrderSettings {
        self.settings
    }

    /// Create, persist, and announce an order.
    ///
    /// Nothing is written when validation, a catalog call, or the stock
    /// check fails. If publishing fails the order stays persisted and the
    /// publish error is returned.
    pub async fn create_order(&self, user_id: UserId, lines: &[OrderLine]) -> Result<Order> {
        let requested = validate_lines(lines)?;

        let mut demand: Vec<(ProductId, u64)> = Vec::new();
        for &(product_id, quantity) in &requested {
            match demand.iter_mut().find(|(id, _)| *id == product_id) {
                Some((_, total)) => *total = total.saturating_add(quantity),
                None => demand.push((product_id, quantity)),
            }
        }

        let mut products: HashMap<ProductId, Product> = HashMap::with_capacity(demand.len());
        for (product_id, wanted) in demand {
            let product = self.fetch_product(product_id).await?;
            if product.stock < wanted {
                debug!(
                    product_id = %product_id,
                    requested = wanted,
                    available = product.stock,
                    "Order rejected for insufficient stock"
                );
                return Err(Error::InsufficientStock {
                    product_id,
                    name: product.name,
                    requested: wanted,
                    available: product.stock,
                });
            }
            products.insert(product_id, product);
        }

        let items = requested
            .iter()
            .map(|&(product_id, quantity)| {
                products
                    .get(&product_id)
                    .ok_or_else(|| Error::not_found("product", product_id))
                    .and_then(|product| Ok(OrderItem::priced(product, quantity)?))
            })
            .collect::<Result<Vec<_>>>()?;
        // Reject totals that overflow before an id is spent.
        checked_sum(items.iter().map(|item| item.total_price))?;

        let id = OrderId::new(self.sequence.next(ORDERS_COLLECTION).await?);
        let order = Order::pending(id, user_id, items, Utc::now())?;
        self.store.create(&order).await?;
        info!(
            order_id = %order.id,
            user_id = %user_id,
            items = order.items.len(),
            total = %order.total_amount,
            "Order created"
        );

        let event = OrderCreated::from_order(&order);
        if let Err(e) = self.publisher.publish_order_created(&event).await {
            error!(order_id = %order.id, error = %e, "Failed to publish order event");
            return Err(e);
        }

        Ok(order)
    }

    /// First order matching the filter, priced per [`ReadPricing`].
    pub async fn get_order(&self, filter: &OrderFilter) -> Result<Order> {
        let mut order = self.store.get(filter).await?;
        if self.settings.read_pricing == ReadPricing::Current {
            let mut seen = HashMap::new();
            self.reprice(&mut order, &mut seen).await?;
        }
        Ok(order)
    }

    /// A page of matching orders, priced per [`ReadPricing`].
    pub async fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
        let mut result = self.store.list(filter, page).await?;
        if self.settings.read_pricing == ReadPricing::Current {
            let mut seen = HashMap::new();
            for order in &mut result.items {
                self.reprice(order, &mut seen).await?;
            }
        }
        Ok(result)
    }

    /// Set the status of the first matching order and stamp `updated_at`.
    ///
    /// The total is never recomputed here.
    pub async fn update_order(&self, filter: &OrderFilter, status: OrderStatus) -> Result<Order> {
        if self.settings.transitions == TransitionPolicy::Strict {
            let current = self.store.get(filter).await?;
            self.settings.transitions.check(current.status, status)?;
        }

        let update = OrderUpdate {
            status: Some(status),
            updated_at: Some(Utc::now()),
        };
        let order = self.store.update(filter, &update).await?;
        info!(order_id = %order.id, status = %status, "Order status updated");
        Ok(order)
    }

    pub async fn delete_order(&self, filter: &OrderFilter) -> Result<()> {
        self.store.delete(filter).await?;
        info!(filter = ?filter, "Order deleted");
        Ok(())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product> {
        let deadline = self.settings.rpc_timeout;
        match tokio::time::timeout(deadline, self.catalog.get_product(id)).await {
            Ok(result) => result,
            Err(_) => {
                let after_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                warn!(product_id = %id, timeout_ms = after_ms, "Catalog call timed out");
                Err(Error::Timeout {
                    operation: "catalog.get_product",
                    after_ms,
                })
            }
        }
    }

    /// Replace item names and prices with current catalog values and
    /// recompute the total. Products that no longer exist keep their
    /// snapshot.
    async fn reprice(
        &self,
        order: &mut Order,
        seen: &mut HashMap<ProductId, Option<Product>>,
    ) -> Result<()> {
        for item in &mut order.items {
            if !seen.contains_key(&item.product_id) {
                let current = match self.fetch_product(item.product_id).await {
                    Ok(product) => Some(product),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        warn!(
                            order_id = %order.id,
                            product_id = %item.product_id,
                            "Product gone, keeping price snapshot"
                        );
                        None
                    }
                    Err(e) => return Err(e),
                };
                seen.insert(item.product_id, current);
            }
            if let Some(Some(product)) = seen.get(&item.product_id) {
                item.reprice(product)?;
            }
        }
        order.recompute_total()?;
        Ok(())
    }
}

/// Positive quantities for every line, or the first violation.
fn validate_lines(lines: &[OrderLine]) -> std::result::Result<Vec<(ProductId, u64)>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::EmptyOrder);
    }
    lines
        .iter()
        .map(|line| Ok((line.product_id, line.checked_quantity()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::{MemoryOrderStore, MemorySequence};
    use crate::domain::OrderCreatedItem;
    use crate::testkit::doubles::{RecordingPublisher, StubCatalog};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn huge_price() -> Decimal {
        Decimal::from_i128_with_scale(10_i128.pow(28), 0)
    }

    struct Harness {
        service: OrderService,
        catalog: Arc<StubCatalog>,
        store: Arc<MemoryOrderStore>,
        publisher: Arc<RecordingPublisher>,
    }

    fn harness_with(
        catalog: StubCatalog,
        publisher: RecordingPublisher,
        settings: OrderSettings,
    ) -> Harness {
        let catalog = Arc::new(catalog);
        let store = Arc::new(MemoryOrderStore::new());
        let publisher = Arc::new(publisher);
        let service = OrderService::new(
            store.clone(),
            catalog.clone(),
            Arc::new(MemorySequence::new()),
            publisher.clone(),
            settings,
        );
        Harness {
            service,
            catalog,
            store,
            publisher,
        }
    }

    fn harness(catalog: StubCatalog) -> Harness {
        harness_with(catalog, RecordingPublisher::default(), OrderSettings::default())
    }

    #[tokio::test]
    async fn create_prices_items_and_publishes_once() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(10.0), 5)]));

        let order = h
            .service
            .create_order(UserId::new(9), &[OrderLine::new(ProductId::new(1), 2)])
            .await
            .unwrap();

        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].total_price, dec!(20.0));
        assert_eq!(order.total_amount, dec!(20.0));

        let events = h.publisher.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].items,
            vec![OrderCreatedItem {
                product_id: ProductId::new(1),
                quantity: 2
            }]
        );
    }

    #[tokio::test]
    async fn insufficient_stock_persists_nothing() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(10.0), 1)]));

        let err = h
            .service
            .create_order(UserId::new(9), &[OrderLine::new(ProductId::new(1), 2)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        let page = h
            .store
            .list(&OrderFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(h.publisher.events.lock().is_empty());
    }

    #[tokio::test]
    async fn repeated_lines_are_summed_for_the_stock_check() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(1.0), 3)]));
        let lines = [
            OrderLine::new(ProductId::new(1), 2),
            OrderLine::new(ProductId::new(1), 2),
        ];

        let err = h.service.create_order(UserId::new(1), &lines).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientStock { requested: 4, available: 3, .. }
        ));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_invalid_before_catalog_calls() {
        let h = harness(StubCatalog::default());
        for quantity in [0, -3] {
            let err = h
                .service
                .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(404), quantity)])
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        let err = h.service.create_order(UserId::new(1), &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let h = harness(StubCatalog::default());
        let err = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(7), 1)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_catalog_hits_the_deadline() {
        let mut catalog = StubCatalog::with(&[(1, "Widget", dec!(1.0), 3)]);
        catalog.delay = Some(Duration::from_secs(5));
        let settings = OrderSettings {
            rpc_timeout: Duration::from_millis(100),
            ..OrderSettings::default()
        };
        let h = harness_with(catalog, RecordingPublisher::default(), settings);

        let err = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 1)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(h.publisher.events.lock().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_keeps_the_order() {
        let publisher = RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        };
        let h = harness_with(
            StubCatalog::with(&[(1, "Widget", dec!(1.0), 3)]),
            publisher,
            OrderSettings::default(),
        );

        let err = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 1)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unavailable);
        let stored = h.store.get(&OrderFilter::by_id(OrderId::new(1))).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn overflowing_total_is_rejected_without_side_effects() {
        let h = harness(StubCatalog::with(&[(1, "Bullion", huge_price(), 100)]));

        let err = h
            .service
            .create_order(UserId::new(9), &[OrderLine::new(ProductId::new(1), 10)])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Domain(DomainError::AmountOverflow(_))));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let page = h
            .store
            .list(&OrderFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(h.publisher.events.lock().is_empty());
    }

    #[tokio::test]
    async fn repricing_into_overflow_is_an_error_not_a_panic() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(10.0), 50)]));
        let order = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 10)])
            .await
            .unwrap();

        h.catalog.set_price(1, huge_price());
        let err = h
            .service
            .get_order(&OrderFilter::by_id(order.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = h
            .service
            .list_orders(&OrderFilter::default(), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn reads_follow_current_prices_by_default() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(10.0), 5)]));
        let order = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 2)])
            .await
            .unwrap();

        h.catalog.set_price(1, dec!(12.0));
        let read = h.service.get_order(&OrderFilter::by_id(order.id)).await.unwrap();

        assert_eq!(read.items[0].price, dec!(12.0));
        assert_eq!(read.total_amount, dec!(24.0));
    }

    #[tokio::test]
    async fn snapshot_pricing_returns_stored_values() {
        let settings = OrderSettings {
            read_pricing: ReadPricing::Snapshot,
            ..OrderSettings::default()
        };
        let h = harness_with(
            StubCatalog::with(&[(1, "Widget", dec!(10.0), 5)]),
            RecordingPublisher::default(),
            settings,
        );
        let order = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 2)])
            .await
            .unwrap();

        h.catalog.set_price(1, dec!(12.0));
        let read = h.service.get_order(&OrderFilter::by_id(order.id)).await.unwrap();
        assert_eq!(read.total_amount, dec!(20.0));
    }

    #[tokio::test]
    async fn deleted_product_keeps_snapshot_on_read() {
        let h = harness(StubCatalog::with(&[
            (1, "Widget", dec!(10.0), 5),
            (2, "Gadget", dec!(1.5), 5),
        ]));
        let order = h
            .service
            .create_order(
                UserId::new(1),
                &[
                    OrderLine::new(ProductId::new(1), 1),
                    OrderLine::new(ProductId::new(2), 2),
                ],
            )
            .await
            .unwrap();

        h.catalog.remove(1);
        h.catalog.set_price(2, dec!(2.0));
        let page = h
            .service
            .list_orders(&OrderFilter::by_user(UserId::new(1)), PageRequest::default())
            .await
            .unwrap();

        let read = &page.items[0];
        assert_eq!(read.id, order.id);
        assert_eq!(read.items[0].price, dec!(10.0));
        assert_eq!(read.items[1].price, dec!(2.0));
        assert_eq!(read.total_amount, dec!(14.0));
    }

    #[tokio::test]
    async fn permissive_updates_allow_any_transition_and_keep_total() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(10.0), 5)]));
        let order = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 1)])
            .await
            .unwrap();
        let filter = OrderFilter::by_id(order.id);

        h.service.update_order(&filter, OrderStatus::Delivered).await.unwrap();
        let back = h.service.update_order(&filter, OrderStatus::Pending).await.unwrap();

        assert_eq!(back.status, OrderStatus::Pending);
        assert_eq!(back.total_amount, order.total_amount);
        assert!(back.updated_at >= order.updated_at);
    }

    #[tokio::test]
    async fn strict_updates_reject_backward_moves() {
        let settings = OrderSettings {
            transitions: TransitionPolicy::Strict,
            ..OrderSettings::default()
        };
        let h = harness_with(
            StubCatalog::with(&[(1, "Widget", dec!(10.0), 5)]),
            RecordingPublisher::default(),
            settings,
        );
        let order = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 1)])
            .await
            .unwrap();
        let filter = OrderFilter::by_id(order.id);

        h.service.update_order(&filter, OrderStatus::Paid).await.unwrap();
        let err = h
            .service
            .update_order(&filter, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let h = harness(StubCatalog::with(&[(1, "Widget", dec!(10.0), 5)]));
        let order = h
            .service
            .create_order(UserId::new(1), &[OrderLine::new(ProductId::new(1), 1)])
            .await
            .unwrap();
        let filter = OrderFilter::by_id(order.id);

        h.service.delete_order(&filter).await.unwrap();
        assert_eq!(
            h.service.get_order(&filter).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
