//! SQLite sequence generator backed by the `counters` table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};

use super::database::connection::{interact, DbPool};
use super::database::model::from_db;
use crate::error::Result;
use crate::port::outbound::sequence::SequenceGenerator;

const NEXT_VALUE_SQL: &str = "INSERT INTO counters (name, value) VALUES (?, 1) \
     ON CONFLICT(name) DO UPDATE SET value = value + 1 \
     RETURNING value";

#[derive(QueryableByName)]
struct CounterValue {
    #[diesel(sql_type = BigInt)]
    value: i64,
}

/// Counter rows incremented with a single upsert statement, so the
/// increment and the read happen under one write lock.
pub struct SqliteSequence {
    pool: DbPool,
}

impl SqliteSequence {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceGenerator for SqliteSequence {
    async fn next(&self, collection: &str) -> Result<u64> {
        let collection = collection.to_owned();
        let value = interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                diesel::sql_query(NEXT_VALUE_SQL)
                    .bind::<Text, _>(&collection)
                    .get_result::<CounterValue>(conn)
            })
            .map_err(Into::into)
        })
        .await?;
        from_db(value.value, "counter")
    }
}
