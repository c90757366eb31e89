//! SQLite order store implementation.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use super::database::connection::{interact, DbPool};
use super::database::model::{from_db, parse_timestamp, to_db, OrderRow};
use super::database::schema::orders;
use crate::domain::{
    Order, OrderFilter, OrderId, OrderItem, OrderStatus, OrderUpdate, Page, PageRequest, UserId,
};
use crate::error::{Error, Result};
use crate::port::outbound::order::OrderStore;

/// SQLite-backed order store.
pub struct SqliteOrderStore {
    pool: DbPool,
}

impl SqliteOrderStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_row(order: &Order) -> Result<OrderRow> {
        Ok(OrderRow {
            id: to_db(order.id.value(), "order id")?,
            user_id: to_db(order.user_id.value(), "user id")?,
            items: serde_json::to_string(&order.items)?,
            total_amount: order.total_amount.to_string(),
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        })
    }

    fn from_row(row: OrderRow) -> Result<Order> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items)?;
        let total_amount = Decimal::from_str(&row.total_amount).map_err(|e| {
            Error::Database(format!("invalid total {:?}: {e}", row.total_amount))
        })?;
        let status = OrderStatus::from_str(&row.status)
            .map_err(|e| Error::Database(format!("order {}: {e}", row.id)))?;
        Ok(Order {
            id: OrderId::new(from_db(row.id, "order id")?),
            user_id: UserId::new(from_db(row.user_id, "user id")?),
            items,
            total_amount,
            status,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn filtered(filter: &OrderFilter) -> Result<orders::BoxedQuery<'static, Sqlite>> {
    let mut query = orders::table.into_boxed();
    if let Some(id) = filter.id {
        query = query.filter(orders::id.eq(to_db(id.value(), "order id")?));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::user_id.eq(to_db(user_id.value(), "user id")?));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    Ok(query)
}

fn first_match(conn: &mut SqliteConnection, filter: &OrderFilter) -> Result<OrderRow> {
    filtered(filter)?
        .order(orders::id.asc())
        .first::<OrderRow>(conn)
        .optional()?
        .ok_or_else(|| {
            let key = filter
                .id
                .map_or_else(|| format!("{filter:?}"), |id| id.to_string());
            Error::NotFound {
                entity: "order",
                key,
            }
        })
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn create(&self, order: &Order) -> Result<()> {
        let row = Self::to_row(order)?;
        let id = order.id;
        interact(&self.pool, move |conn| {
            let inserted = diesel::insert_into(orders::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(conn)?;
            if inserted == 0 {
                return Err(Error::AlreadyExists {
                    entity: "order",
                    key: id.to_string(),
                });
            }
            Ok(())
        })
        .await
    }

    async fn get(&self, filter: &OrderFilter) -> Result<Order> {
        let filter = filter.clone();
        let row = interact(&self.pool, move |conn| first_match(conn, &filter)).await?;
        Self::from_row(row)
    }

    async fn list(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
        let filter = filter.clone();
        let skip = to_db(page.skip(), "offset")?;
        let limit = to_db(page.limit(), "limit")?;
        let (rows, total) = interact(&self.pool, move |conn| {
            let total: i64 = filtered(&filter)?.count().get_result(conn)?;
            let rows: Vec<OrderRow> = filtered(&filter)?
                .order(orders::id.asc())
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

    async fn update(&self, filter: &OrderFilter, update: &OrderUpdate) -> Result<Order> {
        let filter = filter.clone();
        let update = update.clone();
        let row = interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                let current = first_match(conn, &filter)?;
                let id = current.id;
                if let Some(status) = update.status {
                    diesel::update(orders::table.find(id))
                        .set(orders::status.eq(status.as_str()))
                        .execute(conn)?;
                }
                if let Some(updated_at) = update.updated_at {
                    diesel::update(orders::table.find(id))
                        .set(orders::updated_at.eq(updated_at.to_rfc3339()))
                        .execute(conn)?;
                }
                Ok(orders::table.find(id).first::<OrderRow>(conn)?)
            })
        })
        .await?;
        Self::from_row(row)
    }

    async fn delete(&self, filter: &OrderFilter) -> Result<()> {
        let filter = filter.clone();
        interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                let current = first_match(conn, &filter)?;
                diesel::delete(orders::table.find(current.id)).execute(conn)?;
                Ok(())
            })
        })
        .await
    }
}
