//! SQLite catalog store implementation.
//!
//! Prices are stored as decimal strings so they round-trip without loss.
//! Single-record writes and the stock decrement run inside immediate
//! transactions, which take the database write lock up front.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use super::database::connection::{interact, DbPool};
use super::database::model::{
    from_db, parse_timestamp, to_db, AppliedTokenRow, ProductChangeset, ProductRow,
};
use super::database::schema::{applied_stock_tokens, products};
use crate::domain::{
    Page, PageRequest, Product, ProductFilter, ProductId, ProductUpdate, StockAdjustment,
    StockToken,
};
use crate::error::{Error, Result};
use crate::port::outbound::catalog::CatalogStore;

/// SQLite-backed catalog store.
pub struct SqliteCatalogStore {
    pool: DbPool,
}

impl SqliteCatalogStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(product: &Product) -> Result<ProductRow> {
        Ok(ProductRow {
            id: to_db(product.id.value(), "product id")?,
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            stock: to_db(product.stock, "stock")?,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        })
    }

    fn from_row(row: ProductRow) -> Result<Product> {
        let price = Decimal::from_str(&row.price)
            .map_err(|e| Error::Database(format!("invalid price {:?}: {e}", row.price)))?;
        Ok(Product {
            id: ProductId::new(from_db(row.id, "product id")?),
            name: row.name,
            category: row.category,
            price,
            stock: from_db(row.stock, "stock")?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }

    fn to_changeset(update: &ProductUpdate) -> Result<ProductChangeset> {
        Ok(ProductChangeset {
            name: update.name.clone(),
            category: update.category.clone(),
            price: update.price.map(|p| p.to_string()),
            stock: update.stock.map(|s| to_db(s, "stock")).transpose()?,
            updated_at: update.updated_at.map(|ts| ts.to_rfc3339()),
        })
    }
}

fn filtered(filter: &ProductFilter) -> Result<products::BoxedQuery<'static, Sqlite>> {
    let mut query = products::table.into_boxed();
    if let Some(id) = filter.id {
        query = query.filter(products::id.eq(to_db(id.value(), "product id")?));
    }
    if let Some(name) = &filter.name {
        query = query.filter(products::name.eq(name.clone()));
    }
    if let Some(category) = &filter.category {
        query = query.filter(products::category.eq(category.clone()));
    }
    Ok(query)
}

fn first_match(conn: &mut SqliteConnection, filter: &ProductFilter) -> Result<ProductRow> {
    filtered(filter)?
        .order(products::id.asc())
        .first::<ProductRow>(conn)
        .optional()?
        .ok_or_else(|| Error::not_found("product", describe(filter)))
}

fn describe(filter: &ProductFilter) -> String {
    match (&filter.id, &filter.name, &filter.category) {
        (Some(id), _, _) => id.to_string(),
        (None, Some(name), _) => format!("name={name}"),
        (None, None, Some(category)) => format!("category={category}"),
        (None, None, None) => "any".to_string(),
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn create(&self, product: &Product) -> Result<()> {
        let row = Self::to_row(product)?;
        let id = product.id;
        interact(&self.pool, move |conn| {
            let inserted = diesel::insert_into(products::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(conn)?;
            if inserted == 0 {
                return Err(Error::AlreadyExists {
                    entity: "product",
                    key: id.to_string(),
                });
            }
            Ok(())
        })
        .await
    }

    async fn get(&self, filter: &ProductFilter) -> Result<Product> {
        let filter = filter.clone();
        let row = interact(&self.pool, move |conn| first_match(conn, &filter)).await?;
        Self::from_row(row)
    }

    async fn list(&self, filter: &ProductFilter, page: PageRequest) -> Result<Page<Product>> {
        let filter = filter.clone();
        let skip = to_db(page.skip(), "offset")?;
        let limit = to_db(page.limit(), "limit")?;
        let (rows, total) = interact(&self.pool, move |conn| {
            let total: i64 = filtered(&filter)?.count().get_result(conn)?;
            let rows: Vec<ProductRow> = filtered(&filter)?
                .order(products::id.asc())
                .offset(skip)
                .limit(limit)
                .load(conn)?;
            Ok((rows, total))
        })
        .await?;

        let items = rows
            .into_iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, from_db(total, "count")?, page))
    }

    async fn update(&self, filter: &ProductFilter, update: &ProductUpdate) -> Result<Product> {
        let filter = filter.clone();
        let changes = Self::to_changeset(update)?;
        let empty = *update == ProductUpdate::default();
        let row = interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                let current = first_match(conn, &filter)?;
                if empty {
                    return Ok(current);
                }
                diesel::update(products::table.find(current.id))
                    .set(&changes)
                    .execute(conn)?;
                Ok(products::table.find(current.id).first::<ProductRow>(conn)?)
            })
        })
        .await?;
        Self::from_row(row)
    }

    async fn delete(&self, filter: &ProductFilter) -> Result<Product> {
        let filter = filter.clone();
        let row = interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                let current = first_match(conn, &filter)?;
                diesel::delete(products::table.find(current.id)).execute(conn)?;
                Ok(current)
            })
        })
        .await?;
        Self::from_row(row)
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
        token: Option<&StockToken>,
    ) -> Result<StockAdjustment> {
        let db_id = to_db(id.value(), "product id")?;
        let db_quantity = to_db(quantity, "quantity")?;
        let token = token.map(|t| t.as_str().to_owned());

        interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                if let Some(token) = &token {
                    let seen = applied_stock_tokens::table
                        .find(token)
                        .select(applied_stock_tokens::token)
                        .first::<String>(conn)
                        .optional()?;
                    if seen.is_some() {
                        return Ok(StockAdjustment::Duplicate);
                    }
                }

                let (name, stock) = products::table
                    .find(db_id)
                    .select((products::name, products::stock))
                    .first::<(String, i64)>(conn)
                    .optional()?
                    .ok_or_else(|| Error::not_found("product", id))?;

                if stock < db_quantity {
                    return Err(Error::InsufficientStock {
                        product_id: id,
                        name,
                        requested: quantity,
                        available: from_db(stock, "stock")?,
                    });
                }

                let now = Utc::now().to_rfc3339();
                let remaining = stock - db_quantity;
                diesel::update(products::table.find(db_id))
                    .set((products::stock.eq(remaining), products::updated_at.eq(&now)))
                    .execute(conn)?;

                if let Some(token) = token {
                    diesel::insert_into(applied_stock_tokens::table)
                        .values(AppliedTokenRow {
                            token,
                            applied_at: now,
                        })
                        .execute(conn)?;
                }

                Ok(StockAdjustment::Applied {
                    remaining: from_db(remaining, "stock")?,
                })
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::domain::{NewProduct, OrderId};
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SqliteCatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteCatalogStore::new(pool))
    }

    fn product(id: u64, category: &str, stock: u64) -> Product {
        NewProduct {
            name: format!("item-{id}"),
            category: category.into(),
            price: dec!(12.50),
            stock,
        }
        .into_product(ProductId::new(id), Utc::now())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (_dir, store) = setup();
        let original = product(1, "tools", 5);
        store.create(&original).await.unwrap();

        let loaded = store.get(&ProductFilter::by_id(ProductId::new(1))).await.unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.price, dec!(12.50));
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let (_dir, store) = setup();
        store.create(&product(1, "tools", 5)).await.unwrap();
        let err = store.create(&product(1, "tools", 5)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let (_dir, store) = setup();
        let err = store
            .get(&ProductFilter::by_id(ProductId::new(9)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn list_filters_and_pages_by_id() {
        let (_dir, store) = setup();
        for id in (1..=6).rev() {
            let category = if id % 2 == 0 { "even" } else { "odd" };
            store.create(&product(id, category, 1)).await.unwrap();
        }

        let page = store
            .list(&ProductFilter::by_category("even"), PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        let ids: Vec<u64> = page.items.iter().map(|p| p.id.value()).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn update_writes_only_present_fields() {
        let (_dir, store) = setup();
        store.create(&product(1, "tools", 5)).await.unwrap();

        let updated = store
            .update(
                &ProductFilter::by_id(ProductId::new(1)),
                &ProductUpdate {
                    price: Some(dec!(9.99)),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, dec!(9.99));
        assert_eq!(updated.category, "tools");
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let (_dir, store) = setup();
        store.create(&product(1, "tools", 5)).await.unwrap();
        let filter = ProductFilter::by_id(ProductId::new(1));

        let removed = store.delete(&filter).await.unwrap();
        assert_eq!(removed.id, ProductId::new(1));
        assert_eq!(store.delete(&filter).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn decrement_refuses_to_go_negative() {
        let (_dir, store) = setup();
        store.create(&product(1, "tools", 2)).await.unwrap();

        let err = store
            .decrement_stock(ProductId::new(1), 3, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        let adjusted = store.decrement_stock(ProductId::new(1), 2, None).await.unwrap();
        assert_eq!(adjusted, StockAdjustment::Applied { remaining: 0 });
    }

    #[tokio::test]
    async fn decrement_with_token_applies_once() {
        let (_dir, store) = setup();
        store.create(&product(1, "tools", 10)).await.unwrap();
        let token = StockToken::new(OrderId::new(1), 0, ProductId::new(1));

        let first = store
            .decrement_stock(ProductId::new(1), 3, Some(&token))
            .await
            .unwrap();
        let second = store
            .decrement_stock(ProductId::new(1), 3, Some(&token))
            .await
            .unwrap();

        assert_eq!(first, StockAdjustment::Applied { remaining: 7 });
        assert_eq!(second, StockAdjustment::Duplicate);
        let stock = store
            .get(&ProductFilter::by_id(ProductId::new(1)))
            .await
            .unwrap()
            .stock;
        assert_eq!(stock, 7);
    }
}
