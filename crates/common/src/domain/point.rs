use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::result::BridgeResult;

/// Measurement name shared by every point this bridge emits
pub const MEASUREMENT: &str = "meshtastic";

/// One normalized time-series record.
///
/// Tags carry low-cardinality classification data (message type, channel,
/// addresses, joined node identity); fields carry the measured values.
/// Immutable once built, not retained after its batch is dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub measurement: &'static str,
    pub tags: Map<String, Value>,
    pub fields: Map<String, Value>,
}

impl DataPoint {
    pub fn new() -> Self {
        Self {
            measurement: MEASUREMENT,
            tags: Map::new(),
            fields: Map::new(),
        }
    }
}

impl Default for DataPoint {
    fn default() -> Self {
        Self::new()
    }
}

/// Input for writing the points produced from a single message
#[derive(Debug, Clone)]
pub struct WriteBatchInput {
    pub points: Vec<DataPoint>,
}

/// Time-series write sink.
///
/// One call per inbound message; the batch is submitted atomically and is
/// never split, retried, or resubmitted by the caller. The sink does not
/// promise to preserve ordering within a batch.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PointSink: Send + Sync {
    async fn write_batch(&self, input: WriteBatchInput) -> BridgeResult<()>;
}
