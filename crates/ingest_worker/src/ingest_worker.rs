use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use common::{NatsClient, NodeDirectory, PointSink};

use crate::domain::TranslationService;
use crate::nats::run_message_loop;

pub struct IngestWorkerConfig {
    /// Subject pattern the mesh gateway publishes JSON documents on
    pub inbound_subject: String,
}

/// Wires the translation service to the inbound subscription.
///
/// The directory and sink are injected so deployments choose their backends
/// (Postgres/ClickHouse in production, in-memory in tests).
pub struct IngestWorker {
    subscriber: async_nats::Subscriber,
    service: Arc<TranslationService>,
}

impl IngestWorker {
    pub async fn new(
        directory: Arc<dyn NodeDirectory>,
        sink: Arc<dyn PointSink>,
        nats_client: &NatsClient,
        config: IngestWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!(subject = %config.inbound_subject, "initializing ingest worker");

        let subscriber = nats_client.subscribe(&config.inbound_subject).await?;
        let service = Arc::new(TranslationService::new(directory, sink));

        Ok(Self {
            subscriber,
            service,
        })
    }

    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        run_message_loop(self.subscriber, self.service, shutdown).await
    }
}
