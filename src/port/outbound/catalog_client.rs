//! Synchronous catalog access used by the order side.

use async_trait::async_trait;

use crate::domain::{Product, ProductId};
use crate::error::Result;

/// Request/response view of the catalog as seen from the order orchestrator.
///
/// Reads go through the catalog's cache-aside path. Deadlines are applied by
/// the caller.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn get_product(&self, id: ProductId) -> Result<Product>;
}
