use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clickhouse::Row;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::clickhouse::ClickHouseClient;
use crate::domain::{BridgeError, BridgeResult, DataPoint, PointSink, WriteBatchInput};

/// Data point row for ClickHouse storage.
///
/// Tag and field maps are stored as JSON strings; queries unpack them with
/// ClickHouse JSON functions.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct PointRow {
    pub measurement: String,
    pub tags: String,
    pub fields: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub written_at: DateTime<Utc>,
}

impl From<&DataPoint> for PointRow {
    fn from(point: &DataPoint) -> Self {
        let tags = serde_json::to_string(&point.tags).unwrap_or_else(|_| "{}".to_string());
        let fields = serde_json::to_string(&point.fields).unwrap_or_else(|_| "{}".to_string());

        PointRow {
            measurement: point.measurement.to_string(),
            tags,
            fields,
            written_at: Utc::now(),
        }
    }
}

/// ClickHouse implementation of the time-series write sink
#[derive(Clone)]
pub struct ClickHousePointSink {
    client: ClickHouseClient,
    table: String,
}

impl ClickHousePointSink {
    pub fn new(client: ClickHouseClient, table: String) -> Self {
        Self { client, table }
    }

    /// Create the points table on a fresh database
    pub async fn ensure_table(&self) -> BridgeResult<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                measurement String,
                tags String,
                fields String,
                written_at DateTime
            ) ENGINE = MergeTree ORDER BY (measurement, written_at)",
            self.table
        );

        self.client
            .get_client()
            .query(&ddl)
            .execute()
            .await
            .map_err(|e| BridgeError::Repository(e.into()))?;

        debug!(table = %self.table, "points table ready");
        Ok(())
    }
}

#[async_trait]
impl PointSink for ClickHousePointSink {
    async fn write_batch(&self, input: WriteBatchInput) -> BridgeResult<()> {
        if input.points.is_empty() {
            debug!("no points to store, skipping");
            return Ok(());
        }

        debug!(
            point_count = input.points.len(),
            table = %self.table,
            "storing point batch to ClickHouse"
        );

        let rows: Vec<PointRow> = input.points.iter().map(|point| point.into()).collect();

        let mut insert = self
            .client
            .get_client()
            .insert::<PointRow>(&self.table)
            .map_err(|e| {
                error!("failed to create ClickHouse inserter: {}", e);
                BridgeError::WriteSink(e.into())
            })?;

        for row in &rows {
            insert.write(row).await.map_err(|e| {
                error!("failed to write row to ClickHouse: {}", e);
                BridgeError::WriteSink(e.into())
            })?;
        }

        insert.end().await.map_err(|e| {
            error!("failed to finalize ClickHouse insert: {}", e);
            BridgeError::WriteSink(e.into())
        })?;

        debug!(rows_inserted = rows.len(), "successfully stored point batch");

        Ok(())
    }
}
