//! In-process catalog client.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::catalog::CatalogService;
use crate::domain::{Product, ProductId};
use crate::error::Result;
use crate::port::outbound::catalog_client::CatalogClient;

/// Calls the catalog service directly, reading through its cache.
pub struct LocalCatalogClient {
    catalog: Arc<CatalogService>,
}

impl LocalCatalogClient {
    #[must_use]
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CatalogClient for LocalCatalogClient {
    async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.catalog.get_product(id).await
    }
}
