mod support;

use std::collections::HashSet;
use std::sync::Arc;

use stockflow::adapter::outbound::memory::MemorySequence;
use stockflow::adapter::outbound::sqlite::SqliteSequence;
use stockflow::port::outbound::sequence::{
    SequenceGenerator, ORDERS_COLLECTION, PRODUCTS_COLLECTION,
};

use support::temp_db::TempDb;

async fn assert_unique_and_dense(sequence: Arc<dyn SequenceGenerator>, tasks: usize, per_task: usize) {
    let mut handles = Vec::new();
    for _ in 0..tasks {
        let sequence = sequence.clone();
        handles.push(tokio::spawn(async move {
            let mut issued = Vec::with_capacity(per_task);
            for _ in 0..per_task {
                issued.push(sequence.next(ORDERS_COLLECTION).await.unwrap());
            }
            issued
        }));
    }

    let mut all = HashSet::new();
    for handle in handles {
        let issued = handle.await.unwrap();
        assert!(issued.windows(2).all(|w| w[0] < w[1]), "per-caller order");
        all.extend(issued);
    }
    let total = (tasks * per_task) as u64;
    assert_eq!(all.len() as u64, total);
    assert_eq!(all.iter().copied().max(), Some(total));
    assert_eq!(all.iter().copied().min(), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_sequence_is_unique_under_contention() {
    assert_unique_and_dense(Arc::new(MemorySequence::new()), 16, 50).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_sequence_is_unique_under_contention() {
    let db = TempDb::create("sequence");
    assert_unique_and_dense(Arc::new(SqliteSequence::new(db.pool().clone())), 8, 20).await;
}

#[tokio::test]
async fn collections_count_independently() {
    let db = TempDb::create("collections");
    let sequence = SqliteSequence::new(db.pool().clone());

    assert_eq!(sequence.next(PRODUCTS_COLLECTION).await.unwrap(), 1);
    assert_eq!(sequence.next(PRODUCTS_COLLECTION).await.unwrap(), 2);
    assert_eq!(sequence.next(ORDERS_COLLECTION).await.unwrap(), 1);
}
