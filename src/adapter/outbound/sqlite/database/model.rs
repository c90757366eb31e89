//! Database model types for Diesel ORM.
//!
//! Identifiers and quantities are `u64` in the domain and `BIGINT` in SQLite;
//! the helpers at the bottom convert between the two and parse the RFC 3339
//! timestamps stored as TEXT.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{
    applied_stock_tokens, consumer_offsets, event_records, orders, products,
};
use crate::error::{Error, Result};

/// Database row for a product.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial product update; `None` columns are left untouched.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i64>,
    pub updated_at: Option<String>,
}

/// Database row for an applied stock token.
#[derive(Insertable, Debug)]
#[diesel(table_name = applied_stock_tokens)]
pub struct AppliedTokenRow {
    pub token: String,
    pub applied_at: String,
}

/// Database row for an order. Items are stored as a JSON array.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub items: String,
    pub total_amount: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for an event log record.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = event_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRecordRow {
    pub topic: String,
    pub partition_no: i32,
    pub record_offset: i64,
    pub record_key: String,
    pub payload: Vec<u8>,
    pub appended_at: String,
}

/// Database row for a committed consumer group offset.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = consumer_offsets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConsumerOffsetRow {
    pub group_id: String,
    pub topic: String,
    pub partition_no: i32,
    pub next_offset: i64,
}

/// Convert an unsigned domain value into a `BIGINT` column value.
pub fn to_db(value: u64, field: &'static str) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::Database(format!("{field} out of range: {value}")))
}

/// Convert a `BIGINT` column value back into an unsigned domain value.
pub fn from_db(value: i64, field: &'static str) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::Database(format!("negative {field}: {value}")))
}

/// Convert a partition number into an `INTEGER` column value.
pub fn partition_to_db(partition: u32) -> Result<i32> {
    i32::try_from(partition)
        .map_err(|_| Error::Database(format!("partition out of range: {partition}")))
}

pub fn partition_from_db(partition: i32) -> Result<u32> {
    u32::try_from(partition)
        .map_err(|_| Error::Database(format!("negative partition: {partition}")))
}

/// Parse an RFC 3339 timestamp column.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("invalid timestamp {value:?}: {e}")))
}
