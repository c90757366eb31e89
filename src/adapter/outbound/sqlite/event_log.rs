//! SQLite event log: durable partitions plus consumer group offsets.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use super::database::connection::{interact, DbPool};
use super::database::model::{
    from_db, parse_timestamp, partition_from_db, partition_to_db, to_db, ConsumerOffsetRow,
    EventRecordRow,
};
use super::database::schema::{consumer_offsets, event_records};
use crate::error::Result;
use crate::port::outbound::event::{partition_for, EventLog, Record, RecordPosition};

/// Event log persisted in the `event_records` table.
///
/// Offsets are assigned inside an immediate transaction, so concurrent
/// appenders to the same partition serialize on the write lock.
pub struct SqliteEventLog {
    pool: DbPool,
    partitions: u32,
}

impl SqliteEventLog {
    #[must_use]
    pub fn new(pool: DbPool, partitions: u32) -> Self {
        Self {
            pool,
            partitions: partitions.max(1),
        }
    }

    fn from_row(row: EventRecordRow) -> Result<Record> {
        Ok(Record {
            partition: partition_from_db(row.partition_no)?,
            offset: from_db(row.record_offset, "offset")?,
            key: row.record_key,
            payload: row.payload,
            appended_at: parse_timestamp(&row.appended_at)?,
        })
    }
}

#[async_trait]
impl EventLog for SqliteEventLog {
    fn partitions(&self) -> u32 {
        self.partitions
    }

    async fn append(&self, topic: &str, key: &str, payload: &[u8]) -> Result<RecordPosition> {
        let partition = partition_for(key, self.partitions);
        let partition_no = partition_to_db(partition)?;
        let topic = topic.to_owned();
        let key = key.to_owned();
        let payload = payload.to_vec();

        let offset = interact(&self.pool, move |conn| {
            conn.immediate_transaction(|conn| {
                let last: Option<i64> = event_records::table
                    .filter(event_records::topic.eq(&topic))
                    .filter(event_records::partition_no.eq(partition_no))
                    .select(diesel::dsl::max(event_records::record_offset))
                    .first(conn)?;
                let offset = last.map_or(0, |o| o + 1);

                diesel::insert_into(event_records::table)
                    .values(EventRecordRow {
                        topic,
                        partition_no,
                        record_offset: offset,
                        record_key: key,
                        payload,
                        appended_at: Utc::now().to_rfc3339(),
                    })
                    .execute(conn)?;
                Ok(offset)
            })
        })
        .await?;

        Ok(RecordPosition {
            partition,
            offset: from_db(offset, "offset")?,
        })
    }

    async fn read(
        &self,
        topic: &str,
        partition: u32,
        from: u64,
        max: usize,
    ) -> Result<Vec<Record>> {
        let topic = topic.to_owned();
        let partition_no = partition_to_db(partition)?;
        let from = to_db(from, "offset")?;
        let limit = i64::try_from(max).unwrap_or(i64::MAX);

        let rows = interact(&self.pool, move |conn| {
            Ok(event_records::table
                .filter(event_records::topic.eq(&topic))
                .filter(event_records::partition_no.eq(partition_no))
                .filter(event_records::record_offset.ge(from))
                .order(event_records::record_offset.asc())
                .limit(limit)
                .select(EventRecordRow::as_select())
                .load::<EventRecordRow>(conn)?)
        })
        .await?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn committed(&self, group: &str, topic: &str, partition: u32) -> Result<u64> {
        let key = (group.to_owned(), topic.to_owned(), partition_to_db(partition)?);
        let next = interact(&self.pool, move |conn| {
            Ok(consumer_offsets::table
                .find((&key.0, &key.1, key.2))
                .select(consumer_offsets::next_offset)
                .first::<i64>(conn)
                .optional()?)
        })
        .await?;
        next.map_or(Ok(0), |n| from_db(n, "offset"))
    }

    async fn commit(
        &self,
        group: &str,
        topic: &str,
        partition: u32,
        next_offset: u64,
    ) -> Result<()> {
        let row = ConsumerOffsetRow {
            group_id: group.to_owned(),
            topic: topic.to_owned(),
            partition_no: partition_to_db(partition)?,
            next_offset: to_db(next_offset, "offset")?,
        };
        interact(&self.pool, move |conn| {
            diesel::replace_into(consumer_offsets::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
