use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::{BridgeError, BridgeResult, NodeDirectory, NodeRecord, UpsertNodeInput};
use crate::postgres::PostgresClient;

/// PostgreSQL implementation of the node directory.
///
/// One row per address; nodeinfo upserts replace the row in place so the
/// directory always reflects the most recent metadata for a node.
#[derive(Clone)]
pub struct PostgresNodeDirectory {
    client: PostgresClient,
}

impl PostgresNodeDirectory {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    /// Create the nodeinfo table on a fresh database
    pub async fn ensure_schema(&self) -> BridgeResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(BridgeError::Repository)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodeinfo (
                address BIGINT PRIMARY KEY,
                hardware BIGINT NOT NULL,
                longname TEXT NOT NULL,
                shortname TEXT NOT NULL
            )",
            &[],
        )
        .await
        .map_err(|e| BridgeError::Repository(e.into()))?;

        debug!("nodeinfo schema ready");
        Ok(())
    }
}

#[async_trait]
impl NodeDirectory for PostgresNodeDirectory {
    #[instrument(skip(self, input), fields(address = input.address))]
    async fn upsert_node(&self, input: UpsertNodeInput) -> BridgeResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(BridgeError::Repository)?;

        conn.execute(
            "INSERT INTO nodeinfo (address, hardware, longname, shortname)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (address) DO UPDATE
             SET hardware = EXCLUDED.hardware,
                 longname = EXCLUDED.longname,
                 shortname = EXCLUDED.shortname",
            &[
                &input.address,
                &input.hardware,
                &input.longname,
                &input.shortname,
            ],
        )
        .await
        .map_err(|e| BridgeError::Repository(e.into()))?;

        debug!(address = input.address, "node record upserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn lookup_node(&self, address: i64) -> BridgeResult<Option<NodeRecord>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(BridgeError::Repository)?;

        let row = conn
            .query_opt(
                "SELECT address, hardware, longname, shortname
                 FROM nodeinfo WHERE address = $1",
                &[&address],
            )
            .await
            .map_err(|e| BridgeError::Repository(e.into()))?;

        Ok(row.map(|r| NodeRecord {
            address: r.get(0),
            hardware: r.get(1),
            longname: r.get(2),
            shortname: r.get(3),
        }))
    }
}
