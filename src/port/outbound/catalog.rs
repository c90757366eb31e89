//! Catalog store port: the authoritative product records.

use async_trait::async_trait;

use crate::domain::{
    Page, PageRequest, Product, ProductFilter, ProductId, ProductUpdate, StockAdjustment,
    StockToken,
};
use crate::error::Result;

/// Strongly consistent product storage.
///
/// Filters select the first match in ascending id order for single-record
/// operations, mirroring "update one / delete one" semantics.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a product. Fails with `AlreadyExists` when the id is taken.
    async fn create(&self, product: &Product) -> Result<()>;

    /// First product matching the filter, or `NotFound`.
    async fn get(&self, filter: &ProductFilter) -> Result<Product>;

    /// One page of matching products sorted by id, plus the total count.
    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>>;

    /// Apply a partial update to the first match and return the new state.
    /// Fails with `NotFound` when nothing matched.
    async fn update(&self, filter: &ProductFilter, update: &ProductUpdate) -> Result<Product>;

    /// Remove the first match and return it. Fails with `NotFound` when
    /// nothing was removed.
    async fn delete(&self, filter: &ProductFilter) -> Result<Product>;

    /// Take `quantity` units out of stock in a single atomic step.
    ///
    /// Fails with `InsufficientStock` instead of letting stock go negative.
    /// When a token is given and was applied before, nothing changes and
    /// [`StockAdjustment::Duplicate`] is returned.
    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
        token: Option<&StockToken>,
    ) -> Result<StockAdjustment>;
}
