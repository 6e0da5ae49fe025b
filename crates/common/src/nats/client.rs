use anyhow::{Context, Result};
use tracing::info;

/// NATS client wrapper for the inbound mesh message subscription.
///
/// The mesh gateway publishes fire-and-forget JSON on plain subjects, so a
/// core subscription is all the bridge needs; there is no stream persistence
/// on the inbound path.
pub struct NatsClient {
    client: async_nats::Client,
}

impl NatsClient {
    pub async fn connect(url: &str, timeout: std::time::Duration) -> Result<Self> {
        info!(url = %url, timeout_ms = timeout.as_millis(), "Connecting to NATS");

        let client = async_nats::ConnectOptions::new()
            .connection_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Successfully connected to NATS");
        Ok(Self { client })
    }

    /// Subscribe to a subject pattern (wildcards allowed)
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber> {
        self.client
            .subscribe(subject.to_string())
            .await
            .with_context(|| format!("Failed to subscribe to {}", subject))
    }
}
