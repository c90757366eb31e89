mod support;

use rust_decimal_macros::dec;

use stockflow::domain::{
    OrderFilter, OrderItem, OrderStatus, PageRequest, ProductUpdate, UserId,
};
use stockflow::error::{Error, ErrorKind};
use stockflow::infrastructure::bootstrap::Services;
use stockflow::infrastructure::config::settings::Config;
use stockflow::port::outbound::event::EventLog;
use stockflow::testkit::config::{memory_config, sqlite_config};
use stockflow::testkit::domain::{line, new_product};

use support::stored_stock;
use support::temp_db::TempDb;

async fn create_reconcile_and_reprice(config: Config) {
    let services = Services::build(&config).expect("build services");
    let widget = services
        .catalog
        .create_product(new_product("Widget", dec!(10.0), 10))
        .await
        .unwrap();
    let gadget = services
        .catalog
        .create_product(new_product("Gadget", dec!(2.5), 4))
        .await
        .unwrap();

    let order = services
        .orders
        .create_order(UserId::new(42), &[line(widget.id.value(), 3), line(gadget.id.value(), 2)])
        .await
        .unwrap();
    assert_eq!(order.total_amount, dec!(35.0));
    assert_eq!(order.status, OrderStatus::Pending);

    let mut reconciler = services.reconciler().await.unwrap();
    let report = reconciler.poll_once().await.unwrap();
    assert_eq!(report.records, 1);
    assert_eq!(report.applied, 2);
    assert_eq!(stored_stock(&services.catalog_store, widget.id).await, 7);
    assert_eq!(stored_stock(&services.catalog_store, gadget.id).await, 2);

    services
        .catalog
        .update_product(
            widget.id,
            ProductUpdate {
                price: Some(dec!(12.0)),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();

    let read = services
        .orders
        .get_order(&OrderFilter::by_id(order.id))
        .await
        .unwrap();
    assert_eq!(read.items[0].price, dec!(12.0));
    assert_eq!(read.items[0].total_price, dec!(36.0));
    assert_eq!(read.total_amount, dec!(41.0));
}

#[tokio::test]
async fn memory_flow_creates_reconciles_and_reprices() {
    create_reconcile_and_reprice(memory_config()).await;
}

#[tokio::test]
async fn sqlite_flow_creates_reconciles_and_reprices() {
    let db = TempDb::create("flow");
    create_reconcile_and_reprice(sqlite_config(&db.path())).await;
}

#[tokio::test]
async fn rejected_orders_leave_no_trace() {
    let db = TempDb::create("rejected");
    let services = Services::build(&sqlite_config(&db.path())).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Scarce", dec!(5.0), 1))
        .await
        .unwrap();

    let err = services
        .orders
        .create_order(UserId::new(1), &[line(product.id.value(), 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientStock { requested: 2, available: 1, .. }));

    let err = services
        .orders
        .create_order(UserId::new(1), &[line(product.id.value(), 0)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = services
        .orders
        .create_order(UserId::new(1), &[line(999, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let page = services
        .orders
        .list_orders(&OrderFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    for partition in 0..services.events.partitions() {
        let records = services
            .events
            .read("order.created", partition, 0, 10)
            .await
            .unwrap();
        assert!(records.is_empty());
    }
}

#[tokio::test]
async fn sqlite_pagination_is_stable_across_pages() {
    let db = TempDb::create("pages");
    let services = Services::build(&sqlite_config(&db.path())).unwrap();
    for i in 1..=25 {
        services
            .catalog
            .create_product(new_product(&format!("p{i}"), dec!(1.0), 1))
            .await
            .unwrap();
    }

    let page = services
        .catalog
        .list_products(&Default::default(), PageRequest::new(2, 10).unwrap())
        .await
        .unwrap();
    let ids: Vec<u64> = page.items.iter().map(|p| p.id.value()).collect();
    assert_eq!(ids, (11..=20).collect::<Vec<_>>());
    assert_eq!(page.total, 25);

    let last = services
        .catalog
        .list_products(&Default::default(), PageRequest::new(3, 10).unwrap())
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);
}

#[tokio::test]
async fn orders_filter_by_user_and_status() {
    let services = Services::build(&memory_config()).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Pen", dec!(1.0), 100))
        .await
        .unwrap();
    for user in [1, 1, 2] {
        services
            .orders
            .create_order(UserId::new(user), &[line(product.id.value(), 1)])
            .await
            .unwrap();
    }

    let first = services
        .orders
        .update_order(&OrderFilter::by_user(UserId::new(1)), OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(first.status, OrderStatus::Paid);

    let paid = services
        .orders
        .list_orders(
            &OrderFilter {
                user_id: Some(UserId::new(1)),
                status: Some(OrderStatus::Paid),
                ..OrderFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(paid.total, 1);
    assert_eq!(paid.items[0].id, first.id);

    services
        .orders
        .delete_order(&OrderFilter::by_id(first.id))
        .await
        .unwrap();
    let err = services
        .orders
        .get_order(&OrderFilter::by_id(first.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn stored_items_keep_their_snapshot() {
    let services = Services::build(&memory_config()).unwrap();
    let product = services
        .catalog
        .create_product(new_product("Mug", dec!(4.0), 10))
        .await
        .unwrap();
    let order = services
        .orders
        .create_order(UserId::new(3), &[line(product.id.value(), 2)])
        .await
        .unwrap();
    let expected = OrderItem::priced(&product, 2).unwrap();
    assert_eq!(order.items, vec![expected]);
}
