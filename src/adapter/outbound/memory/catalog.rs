//! In-memory catalog store.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::{
    Page, PageRequest, Product, ProductFilter, ProductId, ProductUpdate, StockAdjustment,
    StockToken,
};
use crate::error::{Error, Result};
use crate::port::outbound::catalog::CatalogStore;

#[derive(Debug, Default)]
struct CatalogState {
    products: BTreeMap<ProductId, Product>,
    applied_tokens: HashSet<String>,
}

impl CatalogState {
    fn first_id(&self, filter: &ProductFilter) -> Option<ProductId> {
        self.products
            .values()
            .find(|p| filter.matches(p))
            .map(|p| p.id)
    }
}

/// Products ordered by id behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(filter: &ProductFilter) -> Error {
    match filter.id {
        Some(id) => Error::not_found("product", id),
        None => Error::not_found("product", format!("{filter:?}")),
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn create(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write();
        if state.products.contains_key(&product.id) {
            return Err(Error::AlreadyExists {
                entity: "product",
                key: product.id.to_string(),
            });
        }
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get(&self, filter: &ProductFilter) -> Result<Product> {
        self.state
            .read()
            .products
            .values()
            .find(|p| filter.matches(p))
            .cloned()
            .ok_or_else(|| missing(filter))
    }

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>> {
        let state = self.state.read();
        let matching: Vec<Product> = state
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        Ok(Page::new(page.window(&matching), total, page))
    }

    async fn update(&self, filter: &ProductFilter, update: &ProductUpdate) -> Result<Product> {
        let mut state = self.state.write();
        let id = state.first_id(filter).ok_or_else(|| missing(filter))?;
        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| missing(filter))?;
        update.apply(product);
        Ok(product.clone())
    }

    async fn delete(&self, filter: &ProductFilter) -> Result<Product> {
        let mut state = self.state.write();
        let id = state.first_id(filter).ok_or_else(|| missing(filter))?;
        state.products.remove(&id).ok_or_else(|| missing(filter))
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
        token: Option<&StockToken>,
    ) -> Result<StockAdjustment> {
        let mut state = self.state.write();
        if let Some(token) = token {
            if state.applied_tokens.contains(token.as_str()) {
                return Ok(StockAdjustment::Duplicate);
            }
        }

        let product = state
            .products
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("product", id))?;
        let remaining = product
            .stock
            .checked_sub(quantity)
            .ok_or_else(|| Error::InsufficientStock {
                product_id: id,
                name: product.name.clone(),
                requested: quantity,
                available: product.stock,
            })?;
        product.stock = remaining;
        product.updated_at = Utc::now();

        if let Some(token) = token {
            state.applied_tokens.insert(token.as_str().to_owned());
        }
        Ok(StockAdjustment::Applied { remaining })
    }
}
