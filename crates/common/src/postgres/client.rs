use anyhow::Result;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::debug;

/// Connection settings for the node-directory database
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Maximum number of pooled connections; directory lookups run one
    /// statement each, so a small pool is enough
    pub pool_size: usize,
}

/// Pooled handle to the database backing the node directory.
///
/// Pool construction is lazy: no connection is opened until the first
/// statement runs, so `ping` is the startup reachability check.
#[derive(Clone)]
pub struct PostgresClient {
    pool: Pool,
}

impl PostgresClient {
    pub fn connect(settings: &PostgresSettings) -> Result<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(settings.host.clone());
        cfg.port = Some(settings.port);
        cfg.dbname = Some(settings.database.clone());
        cfg.user = Some(settings.username.clone());
        cfg.password = Some(settings.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        pool.resize(settings.pool_size);

        Ok(Self { pool })
    }

    /// Round-trip a trivial statement to verify the directory database is
    /// reachable before the consumer starts
    pub async fn ping(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client.execute("SELECT 1", &[]).await?;
        debug!("node directory database reachable");
        Ok(())
    }

    pub(crate) async fn get_connection(&self) -> Result<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }
}
