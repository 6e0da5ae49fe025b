use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::result::{BridgeError, BridgeResult};

/// Message type that updates the node directory instead of emitting points
pub const NODEINFO_TYPE: &str = "nodeinfo";
/// Message type whose payload fans out into one point per neighbor
pub const NEIGHBORINFO_TYPE: &str = "neighborinfo";

/// Inbound mesh message envelope as published by the gateway in JSON.
///
/// Only `type` and `from` are required. Tag-candidate fields keep their raw
/// JSON value because firmware versions disagree on their wire types
/// (`channel` may arrive as a number or a string); they are copied into the
/// output verbatim when present.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub from: i64,
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub sender: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub to: Option<Value>,
    #[serde(default)]
    pub hops_away: Option<i64>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub rssi: Option<serde_json::Number>,
    #[serde(default)]
    pub snr: Option<f64>,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

/// Classified payload of a mesh message.
///
/// Known types deserialize strictly; everything else, including types this
/// bridge has never seen, becomes a generic telemetry passthrough so a
/// best-effort point is still emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    NodeInfo(NodeInfoPayload),
    NeighborInfo(NeighborInfoPayload),
    Telemetry(Map<String, Value>),
}

/// Node metadata carried by a nodeinfo message.
///
/// The three known fields are validated strictly; unknown extra keys in the
/// payload are ignored rather than stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeInfoPayload {
    pub hardware: i64,
    pub longname: String,
    pub shortname: String,
}

/// One observation of a neighboring node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NeighborEntry {
    pub node_id: i64,
    pub snr: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NeighborInfoPayload {
    #[serde(default)]
    pub neighbors: Vec<NeighborEntry>,
    /// Remaining payload keys, merged into every expanded point
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MeshMessage {
    /// Parse an inbound document. Unparseable input or a document missing
    /// `type`/`from` is malformed and the message is dropped by the caller.
    pub fn parse(raw: &[u8]) -> BridgeResult<Self> {
        serde_json::from_slice(raw).map_err(|e| BridgeError::MalformedMessage(e.to_string()))
    }

    /// Classify the message by its declared type. Pure dispatch: no state,
    /// and the parsed envelope is never mutated.
    pub fn classify(&self) -> BridgeResult<MessagePayload> {
        match self.message_type.as_str() {
            NODEINFO_TYPE => {
                let payload = self.payload.clone().ok_or_else(|| {
                    BridgeError::InvalidNodeInfo("nodeinfo message without payload".to_string())
                })?;
                let info: NodeInfoPayload = serde_json::from_value(Value::Object(payload))
                    .map_err(|e| BridgeError::InvalidNodeInfo(e.to_string()))?;
                Ok(MessagePayload::NodeInfo(info))
            }
            NEIGHBORINFO_TYPE => {
                let payload = self.payload.clone().unwrap_or_default();
                let info: NeighborInfoPayload = serde_json::from_value(Value::Object(payload))
                    .map_err(|e| BridgeError::MalformedMessage(e.to_string()))?;
                Ok(MessagePayload::NeighborInfo(info))
            }
            _ => Ok(MessagePayload::Telemetry(
                self.payload.clone().unwrap_or_default(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_requires_type_and_from() {
        let missing_type = serde_json::to_vec(&json!({"from": 42})).unwrap();
        assert!(matches!(
            MeshMessage::parse(&missing_type),
            Err(BridgeError::MalformedMessage(_))
        ));

        let missing_from = serde_json::to_vec(&json!({"type": "bme280"})).unwrap();
        assert!(matches!(
            MeshMessage::parse(&missing_from),
            Err(BridgeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn parse_garbage_is_malformed() {
        assert!(matches!(
            MeshMessage::parse(b"not json at all"),
            Err(BridgeError::MalformedMessage(_))
        ));
    }

    #[test]
    fn unknown_type_classifies_as_generic_telemetry() {
        let raw = serde_json::to_vec(&json!({
            "type": "somenewsensor",
            "from": 7,
            "payload": {"lux": 120}
        }))
        .unwrap();
        let msg = MeshMessage::parse(&raw).unwrap();
        match msg.classify().unwrap() {
            MessagePayload::Telemetry(fields) => {
                assert_eq!(fields.get("lux"), Some(&json!(120)));
            }
            other => panic!("expected telemetry passthrough, got {:?}", other),
        }
    }

    #[test]
    fn nodeinfo_requires_known_fields() {
        let raw = serde_json::to_vec(&json!({
            "type": "nodeinfo",
            "from": 7,
            "payload": {"hardware": 43, "longname": "Base Station"}
        }))
        .unwrap();
        let msg = MeshMessage::parse(&raw).unwrap();
        assert!(matches!(
            msg.classify(),
            Err(BridgeError::InvalidNodeInfo(_))
        ));
    }

    #[test]
    fn nodeinfo_ignores_unknown_extra_keys() {
        let raw = serde_json::to_vec(&json!({
            "type": "nodeinfo",
            "from": 7,
            "payload": {
                "id": "!10a37e5c",
                "hardware": 43,
                "longname": "Base Station",
                "shortname": "BS",
                "firmware_build": "2.3.1"
            }
        }))
        .unwrap();
        let msg = MeshMessage::parse(&raw).unwrap();
        match msg.classify().unwrap() {
            MessagePayload::NodeInfo(info) => {
                assert_eq!(info.hardware, 43);
                assert_eq!(info.longname, "Base Station");
                assert_eq!(info.shortname, "BS");
            }
            other => panic!("expected nodeinfo, got {:?}", other),
        }
    }

    #[test]
    fn neighborinfo_splits_neighbors_from_extra_keys() {
        let raw = serde_json::to_vec(&json!({
            "type": "neighborinfo",
            "from": 7,
            "payload": {
                "neighbors": [{"node_id": 9, "snr": 5.25}],
                "node_broadcast_interval_secs": 600
            }
        }))
        .unwrap();
        let msg = MeshMessage::parse(&raw).unwrap();
        match msg.classify().unwrap() {
            MessagePayload::NeighborInfo(info) => {
                assert_eq!(info.neighbors.len(), 1);
                assert_eq!(info.neighbors[0].node_id, 9);
                assert_eq!(
                    info.extra.get("node_broadcast_interval_secs"),
                    Some(&json!(600))
                );
            }
            other => panic!("expected neighborinfo, got {:?}", other),
        }
    }
}
