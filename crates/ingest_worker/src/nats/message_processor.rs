use std::sync::Arc;

use async_nats::Subscriber;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{PipelineOutcome, TranslationService};

/// Drive the inbound subscription until cancelled or the subscription ends.
///
/// Every message is translated independently and synchronously: parse
/// failures, suppressions, and sink failures are logged and the loop moves
/// on to the next message. Nothing here is fatal to the process.
pub async fn run_message_loop(
    mut subscriber: Subscriber,
    service: Arc<TranslationService>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    info!("inbound message loop started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("inbound message loop stopping");
                return Ok(());
            }
            maybe_message = subscriber.next() => {
                let Some(message) = maybe_message else {
                    warn!("inbound subscription closed");
                    return Ok(());
                };

                match service
                    .process_message(message.subject.as_str(), &message.payload)
                    .await
                {
                    Ok(PipelineOutcome::Emitted { points }) => {
                        debug!(subject = %message.subject, points, "points emitted");
                    }
                    Ok(PipelineOutcome::DirectoryUpdated { address }) => {
                        debug!(address, "node directory updated");
                    }
                    Ok(PipelineOutcome::Suppressed { address }) => {
                        debug!(address, "message suppressed");
                    }
                    Err(e) => {
                        error!(
                            error = %e,
                            subject = %message.subject,
                            "failed to translate message, dropping"
                        );
                    }
                }
            }
        }
    }
}
