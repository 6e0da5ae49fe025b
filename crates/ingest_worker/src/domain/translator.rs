use std::sync::Arc;

use tracing::{debug, instrument, warn};

use common::{
    BridgeResult, MeshMessage, MessagePayload, NodeDirectory, PointSink, UpsertNodeInput,
    WriteBatchInput,
};

use crate::domain::{expander, projector};

/// Terminal outcome of one message's pipeline run.
///
/// Suppression is a normal exit, not an error: telemetry from an address the
/// directory has never seen is dropped on purpose so points are never stored
/// without identity tags.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// A nodeinfo message replaced the directory entry for its sender
    DirectoryUpdated { address: i64 },
    /// The message's points were written to the sink
    Emitted { points: usize },
    /// The sender has no directory entry; zero points were produced
    Suppressed { address: i64 },
}

/// Domain service that translates one raw mesh document into time-series
/// points and flushes them.
///
/// Flow:
/// 1. Parse the document and classify it by declared type
/// 2. nodeinfo → upsert the node directory
/// 3. Everything else → project tags/fields, join node identity, expand,
///    and emit one atomic batch
///
/// Each call is independent; a failure never leaves shared state partially
/// mutated because the directory is only written on the nodeinfo path and
/// enrichment happens entirely before the sink write.
pub struct TranslationService {
    directory: Arc<dyn NodeDirectory>,
    sink: Arc<dyn PointSink>,
}

impl TranslationService {
    pub fn new(directory: Arc<dyn NodeDirectory>, sink: Arc<dyn PointSink>) -> Self {
        Self { directory, sink }
    }

    /// Translate one raw document and flush its batch.
    ///
    /// The subject is carried for logging only; it never influences
    /// translation.
    #[instrument(skip(self, raw), fields(subject = %subject))]
    pub async fn process_message(&self, subject: &str, raw: &[u8]) -> BridgeResult<PipelineOutcome> {
        let message = MeshMessage::parse(raw)?;
        let payload = message.classify()?;

        match payload {
            MessagePayload::NodeInfo(info) => {
                self.directory
                    .upsert_node(UpsertNodeInput {
                        address: message.from,
                        hardware: info.hardware,
                        longname: info.longname,
                        shortname: info.shortname,
                    })
                    .await?;
                debug!(address = message.from, "directory updated from nodeinfo");
                Ok(PipelineOutcome::DirectoryUpdated {
                    address: message.from,
                })
            }
            payload => self.enrich_and_emit(&message, &payload).await,
        }
    }

    async fn enrich_and_emit(
        &self,
        message: &MeshMessage,
        payload: &MessagePayload,
    ) -> BridgeResult<PipelineOutcome> {
        let mut tags = projector::project_tags(message);
        let fields = projector::project_fields(message);

        let record = match self.directory.lookup_node(message.from).await? {
            Some(record) => record,
            None => {
                warn!(
                    address = message.from,
                    "sender not in node directory, suppressing message"
                );
                return Ok(PipelineOutcome::Suppressed {
                    address: message.from,
                });
            }
        };
        projector::apply_identity(&mut tags, &record);

        let points = expander::expand(payload, tags, fields);
        let count = points.len();

        self.sink.write_batch(WriteBatchInput { points }).await?;
        debug!(point_count = count, "point batch emitted");
        Ok(PipelineOutcome::Emitted { points: count })
    }
}
