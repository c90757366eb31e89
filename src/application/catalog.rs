//! Catalog use cases: product CRUD with a cache-aside read path.
//!
//! The store is authoritative. The cache is best effort in both directions:
//! read failures count as a miss and write failures are logged, never
//! returned to the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::{
    NewProduct, Page, PageRequest, Product, ProductFilter, ProductId, ProductUpdate,
};
use crate::error::Result;
use crate::port::outbound::cache::ProductCache;
use crate::port::outbound::catalog::CatalogStore;
use crate::port::outbound::sequence::{SequenceGenerator, PRODUCTS_COLLECTION};

/// Product operations over the authoritative store and the advisory cache.
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Arc<dyn ProductCache>,
    sequence: Arc<dyn SequenceGenerator>,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: Arc<dyn ProductCache>,
        sequence: Arc<dyn SequenceGenerator>,
    ) -> Self {
        Self {
            store,
            cache,
            sequence,
        }
    }

    /// Validate, assign an id, persist, then populate the cache.
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        new.validate()?;
        let id = ProductId::new(self.sequence.next(PRODUCTS_COLLECTION).await?);
        let product = new.into_product(id, Utc::now());
        self.store.create(&product).await?;
        info!(product_id = %id, name = %product.name, stock = product.stock, "Product created");
        self.cache_put(&product).await;
        Ok(product)
    }

    /// Cache-aside point read.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        match self.cache.get(id).await {
            Ok(Some(product)) => {
                debug!(product_id = %id, "Product cache hit");
                return Ok(product);
            }
            Ok(None) => debug!(product_id = %id, "Product cache miss"),
            Err(e) => warn!(product_id = %id, error = %e, "Product cache read failed"),
        }

        let product = self.store.get(&ProductFilter::by_id(id)).await?;
        self.cache_put(&product).await;
        Ok(product)
    }

    /// Direct store read by arbitrary filter; bypasses the cache.
    pub async fn find_product(&self, filter: &ProductFilter) -> Result<Product> {
        self.store.get(filter).await
    }

    /// Paginated store read; the returned products warm the cache.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>> {
        let result = self.store.list(filter, page).await?;
        if !result.items.is_empty() {
            if let Err(e) = self.cache.set_many(&result.items).await {
                warn!(count = result.items.len(), error = %e, "Product cache warm failed");
            }
        }
        Ok(result)
    }

    /// Partial update with write-through to the cache.
    pub async fn update_product(&self, id: ProductId, mut update: ProductUpdate) -> Result<Product> {
        update.validate()?;
        update.updated_at = Some(Utc::now());
        let product = self.store.update(&ProductFilter::by_id(id), &update).await?;
        info!(product_id = %id, "Product updated");
        self.cache_put(&product).await;
        Ok(product)
    }

    /// Delete from the store, then invalidate the cache entry.
    pub async fn delete_product(&self, id: ProductId) -> Result<Product> {
        let product = self.store.delete(&ProductFilter::by_id(id)).await?;
        info!(product_id = %id, "Product deleted");
        if let Err(e) = self.cache.delete(id).await {
            warn!(product_id = %id, error = %e, "Product cache invalidation failed");
        }
        Ok(product)
    }

    async fn cache_put(&self, product: &Product) {
        if let Err(e) = self.cache.set(product).await {
            warn!(product_id = %product.id, error = %e, "Product cache write failed");
        }
    }
}
