mod support;

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tokio::sync::watch;

use stockflow::adapter::outbound::codec::MessagePackCodec;
use stockflow::domain::{OrderCreated, UserId, ORDER_CREATED_TOPIC};
use stockflow::infrastructure::bootstrap::Services;
use stockflow::port::outbound::cache::ProductCache;
use stockflow::port::outbound::event::{EventLog, OrderEventCodec};
use stockflow::testkit::config::sqlite_config;
use stockflow::testkit::doubles::FlakyEventLog;
use stockflow::testkit::domain::{line, new_product, order_created};

use support::stored_stock;
use support::temp_db::TempDb;

/// Append the same order event twice, as a redelivering broker would.
async fn deliver_twice(events: &Arc<dyn EventLog>, order_id: u64, product_id: u64, quantity: u64) {
    let event = order_created(order_id, 1, &[(product_id, quantity)]);
    let payload = MessagePackCodec.encode(&event).unwrap();
    for _ in 0..2 {
        events
            .append(ORDER_CREATED_TOPIC, &event.partition_key(), &payload)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn redelivery_decrements_twice_without_tokens() {
    let db = TempDb::create("redelivery");
    let services = Services::build(&sqlite_config(&db.path())).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Widget", dec!(10.0), 10))
        .await
        .unwrap();

    deliver_twice(&services.events, 1, product.id.value(), 3).await;
    let mut reconciler = services.reconciler().await.unwrap();
    let report = reconciler.poll_once().await.unwrap();

    assert_eq!(report.applied, 2);
    assert_eq!(stored_stock(&services.catalog_store, product.id).await, 4);
}

#[tokio::test]
async fn redelivery_is_absorbed_with_tokens() {
    let db = TempDb::create("tokens");
    let mut config = sqlite_config(&db.path());
    config.reconciler.idempotent = true;
    let services = Services::build(&config).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Widget", dec!(10.0), 10))
        .await
        .unwrap();

    deliver_twice(&services.events, 1, product.id.value(), 3).await;
    let mut reconciler = services.reconciler().await.unwrap();
    let report = reconciler.poll_once().await.unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(stored_stock(&services.catalog_store, product.id).await, 7);
}

#[tokio::test]
async fn committed_offsets_survive_a_restart() {
    let db = TempDb::create("restart");
    let config = sqlite_config(&db.path());
    let product_id = {
        let services = Services::build(&config).unwrap();
        let product = services
            .catalog
            .create_product(new_product("Widget", dec!(1.0), 10))
            .await
            .unwrap();
        let payload = MessagePackCodec
            .encode(&order_created(1, 1, &[(product.id.value(), 2)]))
            .unwrap();
        services
            .events
            .append(ORDER_CREATED_TOPIC, "1", &payload)
            .await
            .unwrap();
        let mut reconciler = services.reconciler().await.unwrap();
        assert_eq!(reconciler.poll_once().await.unwrap().records, 1);
        product.id
    };

    let services = Services::build(&config).unwrap();
    let mut reconciler = services.reconciler().await.unwrap();
    assert_eq!(reconciler.poll_once().await.unwrap().records, 0);
    assert_eq!(stored_stock(&services.catalog_store, product_id).await, 8);
}

#[tokio::test]
async fn consumer_group_members_split_the_work() {
    let db = TempDb::create("members");
    let mut config = sqlite_config(&db.path());
    config.events.partitions = 4;
    config.events.members = 2;
    let first = Services::build(&config).unwrap();
    config.events.member_index = 1;
    let second = Services::build(&config).unwrap();

    let product = first
        .catalog
        .create_product(new_product("Widget", dec!(1.0), 100))
        .await
        .unwrap();
    for order_id in 1..=10 {
        let event = order_created(order_id, 1, &[(product.id.value(), 1)]);
        let payload = MessagePackCodec.encode(&event).unwrap();
        first
            .events
            .append(ORDER_CREATED_TOPIC, &event.partition_key(), &payload)
            .await
            .unwrap();
    }

    let a = first.reconciler().await.unwrap().poll_once().await.unwrap();
    let b = second.reconciler().await.unwrap().poll_once().await.unwrap();

    assert_eq!(a.records + b.records, 10);
    assert_eq!(stored_stock(&first.catalog_store, product.id).await, 90);
}

#[tokio::test]
async fn invalidation_keeps_cached_reads_fresh() {
    let db = TempDb::create("invalidate");
    let mut config = sqlite_config(&db.path());
    config.reconciler.invalidate_cache = true;
    let services = Services::build(&config).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Widget", dec!(1.0), 10))
        .await
        .unwrap();
    assert!(services.cache.get(product.id).await.unwrap().is_some());

    deliver_twice(&services.events, 1, product.id.value(), 1).await;
    services.reconciler().await.unwrap().poll_once().await.unwrap();

    assert!(services.cache.get(product.id).await.unwrap().is_none());
    assert_eq!(services.catalog.get_product(product.id).await.unwrap().stock, 8);
}

#[tokio::test]
async fn run_loop_drains_and_stops_on_signal() {
    let db = TempDb::create("run");
    let services = Services::build(&sqlite_config(&db.path())).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Widget", dec!(1.0), 10))
        .await
        .unwrap();
    deliver_twice(&services.events, 1, product.id.value(), 1).await;

    let reconciler = services.reconciler().await.unwrap();
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(reconciler.run(rx));

    let mut waited = Duration::ZERO;
    while stored_stock(&services.catalog_store, product.id).await != 8 {
        assert!(waited < Duration::from_secs(5), "reconciler did not drain");
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += Duration::from_millis(10);
    }
    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn commit_failure_redelivers_on_the_next_poll() {
    let db = TempDb::create("flaky-commit");
    let services = Services::build(&sqlite_config(&db.path())).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Widget", dec!(1.0), 10))
        .await
        .unwrap();
    for order_id in 1..=3 {
        let payload = MessagePackCodec
            .encode(&order_created(order_id, 1, &[(product.id.value(), 1)]))
            .unwrap();
        services
            .events
            .append(ORDER_CREATED_TOPIC, "1", &payload)
            .await
            .unwrap();
    }

    let flaky = Arc::new(FlakyEventLog::new(services.events.clone()));
    let mut reconciler = services.reconciler_over(flaky.clone()).await.unwrap();
    flaky.fail_commits(1);
    assert!(reconciler.poll_once().await.is_err());

    let report = reconciler.poll_once().await.unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(stored_stock(&services.catalog_store, product.id).await, 6);

    let mut restarted = services.reconciler().await.unwrap();
    assert_eq!(restarted.poll_once().await.unwrap().records, 0);
}

#[tokio::test]
async fn repeated_lines_survive_idempotent_redelivery() {
    let db = TempDb::create("repeated-lines");
    let mut config = sqlite_config(&db.path());
    config.reconciler.idempotent = true;
    let services = Services::build(&config).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Widget", dec!(1.0), 10))
        .await
        .unwrap();
    let id = product.id.value();

    let order = services
        .orders
        .create_order(UserId::new(1), &[line(id, 2), line(id, 2)])
        .await
        .unwrap();
    let payload = MessagePackCodec
        .encode(&OrderCreated::from_order(&order))
        .unwrap();
    services
        .events
        .append(ORDER_CREATED_TOPIC, &order.id.to_string(), &payload)
        .await
        .unwrap();

    let report = services.reconciler().await.unwrap().poll_once().await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.duplicates, 2);
    assert_eq!(stored_stock(&services.catalog_store, product.id).await, 6);
}
