use anyhow::Result;
use clickhouse::Client;

/// Connection settings for the time-series store
#[derive(Debug, Clone)]
pub struct ClickHouseSettings {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Handle to the ClickHouse database the point sink writes into.
///
/// The underlying client is connectionless HTTP; `ping` issues a real query
/// so startup fails fast when the store is down.
#[derive(Clone)]
pub struct ClickHouseClient {
    client: Client,
}

impl ClickHouseClient {
    pub fn connect(settings: &ClickHouseSettings) -> Self {
        let client = Client::default()
            .with_url(&settings.url)
            .with_database(&settings.database)
            .with_user(&settings.username)
            .with_password(&settings.password)
            .with_compression(clickhouse::Compression::Lz4);

        Self { client }
    }

    pub async fn ping(&self) -> Result<()> {
        self.client.query("SELECT 1").fetch_one::<u8>().await?;
        Ok(())
    }

    pub(crate) fn get_client(&self) -> &Client {
        &self.client
    }
}
