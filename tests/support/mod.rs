#![allow(dead_code)]

pub mod temp_db;

use std::sync::Arc;

use stockflow::domain::{ProductFilter, ProductId};
use stockflow::port::outbound::catalog::CatalogStore;

/// Stock of `id` as stored, bypassing any cache.
pub async fn stored_stock(store: &Arc<dyn CatalogStore>, id: ProductId) -> u64 {
    store
        .get(&ProductFilter::by_id(id))
        .await
        .expect("product exists")
        .stock
}
