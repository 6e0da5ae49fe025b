mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use common::{
    init_telemetry, ClickHouseClient, ClickHousePointSink, ClickHouseSettings, NatsClient,
    PostgresClient, PostgresNodeDirectory, PostgresSettings, TelemetryConfig,
};
use config::ServiceConfig;
use ingest_worker::{IngestWorker, IngestWorkerConfig};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        service_name: "meshbridge".to_string(),
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!(
        inbound_subject = %config.inbound_subject,
        "Starting meshbridge service"
    );

    if let Err(e) = run(config).await {
        error!("meshbridge terminated with error: {}", e);
        std::process::exit(1);
    }

    info!("meshbridge stopped");
}

async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    // Node directory (PostgreSQL)
    let postgres_client = PostgresClient::connect(&PostgresSettings {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        pool_size: config.postgres_pool_size,
    })?;
    postgres_client.ping().await?;
    let directory = PostgresNodeDirectory::new(postgres_client);
    directory.ensure_schema().await?;

    // Time-series sink (ClickHouse)
    let clickhouse_client = ClickHouseClient::connect(&ClickHouseSettings {
        url: config.clickhouse_url.clone(),
        database: config.clickhouse_database.clone(),
        username: config.clickhouse_username.clone(),
        password: config.clickhouse_password.clone(),
    });
    clickhouse_client.ping().await?;
    let sink = ClickHousePointSink::new(clickhouse_client, config.clickhouse_table.clone());
    sink.ensure_table().await?;

    // Inbound transport (NATS)
    let nats_client = NatsClient::connect(
        &config.nats_url,
        Duration::from_secs(config.nats_connect_timeout_secs),
    )
    .await?;

    let worker = IngestWorker::new(
        Arc::new(directory),
        Arc::new(sink),
        &nats_client,
        IngestWorkerConfig {
            inbound_subject: config.inbound_subject.clone(),
        },
    )
    .await?;

    // Run until the worker exits or a shutdown signal arrives
    let shutdown = CancellationToken::new();
    let mut worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let result = tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received, stopping worker");
            shutdown.cancel();
            worker_handle.await
        }
        result = &mut worker_handle => result,
    };

    match result {
        Ok(worker_result) => worker_result,
        Err(join_error) => Err(anyhow::anyhow!("worker task panicked: {}", join_error)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install SIGINT handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
