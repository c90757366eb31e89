//! Composition root: turns a [`Config`] into wired application services.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::cache::{MemoryProductCache, NoopProductCache};
use crate::adapter::outbound::catalog_client::LocalCatalogClient;
use crate::adapter::outbound::codec::MessagePackCodec;
use crate::adapter::outbound::memory::{
    MemoryCatalogStore, MemoryEventLog, MemoryOrderStore, MemorySequence,
};
use crate::adapter::outbound::publisher::LogOrderPublisher;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::{
    SqliteCatalogStore, SqliteEventLog, SqliteOrderStore, SqliteSequence,
};
use crate::application::catalog::CatalogService;
use crate::application::consumer::{ConsumerSettings, EventConsumer};
use crate::application::order::OrderService;
use crate::application::reconciler::StockReconciler;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, Storage};
use crate::port::outbound::cache::ProductCache;
use crate::port::outbound::catalog::CatalogStore;
use crate::port::outbound::event::{EventLog, OrderEventCodec};
use crate::port::outbound::order::OrderStore;
use crate::port::outbound::sequence::SequenceGenerator;

/// Storage-backed ports shared by every service.
struct Backends {
    catalog: Arc<dyn CatalogStore>,
    orders: Arc<dyn OrderStore>,
    sequence: Arc<dyn SequenceGenerator>,
    events: Arc<dyn EventLog>,
}

/// Application services built from one configuration.
pub struct Services {
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderService>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub cache: Arc<dyn ProductCache>,
    pub events: Arc<dyn EventLog>,
    pub codec: Arc<dyn OrderEventCodec>,
    config: Config,
}

impl Services {
    /// Open storage (running migrations for SQLite) and wire the services.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn build(config: &Config) -> Result<Self> {
        let backends = open_backends(config)?;
        let cache = build_cache(config);
        let codec: Arc<dyn OrderEventCodec> = Arc::new(MessagePackCodec);

        let catalog = Arc::new(CatalogService::new(
            backends.catalog.clone(),
            cache.clone(),
            backends.sequence.clone(),
        ));
        let publisher = Arc::new(LogOrderPublisher::with_codec(
            backends.events.clone(),
            codec.clone(),
            config.events.topic.clone(),
        ));
        let orders = Arc::new(OrderService::new(
            backends.orders,
            Arc::new(LocalCatalogClient::new(catalog.clone())),
            backends.sequence,
            publisher,
            config.orders.settings(),
        ));

        Ok(Self {
            catalog,
            orders,
            catalog_store: backends.catalog,
            cache,
            events: backends.events,
            codec,
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Join the configured consumer group and build a reconciler for it.
    pub async fn reconciler(&self) -> Result<StockReconciler> {
        self.reconciler_over(self.events.clone()).await
    }

    /// Like [`Services::reconciler`], reading from `log` instead of the
    /// configured event log.
    pub async fn reconciler_over(&self, log: Arc<dyn EventLog>) -> Result<StockReconciler> {
        let events = &self.config.events;
        let consumer = EventConsumer::subscribe(
            log,
            ConsumerSettings {
                group: events.consumer_group.clone(),
                topic: events.topic.clone(),
                member_index: events.member_index,
                members: events.members,
                batch_size: events.batch_size,
            },
        )
        .await?;
        Ok(StockReconciler::new(
            self.catalog_store.clone(),
            self.cache.clone(),
            self.codec.clone(),
            consumer,
            self.config.reconciler.settings(self.config.poll_interval()),
        ))
    }
}

fn open_backends(config: &Config) -> Result<Backends> {
    let partitions = config.events.partitions;
    match config.storage {
        Storage::Sqlite => {
            let pool = create_pool(&config.database)?;
            run_migrations(&pool)?;
            info!(database = %config.database, "SQLite storage ready");
            Ok(Backends {
                catalog: Arc::new(SqliteCatalogStore::new(pool.clone())),
                orders: Arc::new(SqliteOrderStore::new(pool.clone())),
                sequence: Arc::new(SqliteSequence::new(pool.clone())),
                events: Arc::new(SqliteEventLog::new(pool, partitions)),
            })
        }
        Storage::Memory => {
            info!("In-memory storage ready; state is lost on exit");
            Ok(Backends {
                catalog: Arc::new(MemoryCatalogStore::new()),
                orders: Arc::new(MemoryOrderStore::new()),
                sequence: Arc::new(MemorySequence::new()),
                events: Arc::new(MemoryEventLog::new(partitions)),
            })
        }
    }
}

fn build_cache(config: &Config) -> Arc<dyn ProductCache> {
    if config.cache.enabled {
        Arc::new(MemoryProductCache::new(config.cache.ttl()))
    } else {
        Arc::new(NoopProductCache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProduct, OrderLine, ProductFilter, UserId};
    use rust_decimal_macros::dec;

    fn memory_config() -> Config {
        Config {
            storage: Storage::Memory,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn memory_services_run_the_full_flow() {
        let services = Services::build(&memory_config()).unwrap();
        let product = services
            .catalog
            .create_product(NewProduct {
                name: "Lamp".into(),
                category: "home".into(),
                price: dec!(12.50),
                stock: 5,
            })
            .await
            .unwrap();

        services
            .orders
            .create_order(
                UserId::new(7),
                &[OrderLine {
                    product_id: product.id,
                    quantity: 2,
                }],
            )
            .await
            .unwrap();

        let mut reconciler = services.reconciler().await.unwrap();
        let report = reconciler.poll_once().await.unwrap();
        assert_eq!(report.applied, 1);

        let stored = services
            .catalog_store
            .get(&ProductFilter::by_id(product.id))
            .await
            .unwrap();
        assert_eq!(stored.stock, 3);
    }

    #[tokio::test]
    async fn sqlite_services_migrate_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database: dir.path().join("app.db").display().to_string(),
            ..Config::default()
        };
        let services = Services::build(&config).unwrap();
        assert_eq!(services.events.partitions(), config.events.partitions);
    }
}
