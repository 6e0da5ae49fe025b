use serde_json::{Map, Value};

use common::{MeshMessage, NodeRecord};

// snr/rssi outside this open interval are sentinel values from the radio
// and are dropped rather than stored.
const SIGNAL_BOUND: f64 = 200.0;

fn within_signal_bounds(value: f64) -> bool {
    value > -SIGNAL_BOUND && value < SIGNAL_BOUND
}

/// Copy the envelope's tag-candidate fields into a tag map.
///
/// Values are copied verbatim when present; `type` and `from` are always
/// present because parsing requires them.
pub fn project_tags(message: &MeshMessage) -> Map<String, Value> {
    let mut tags = Map::new();
    tags.insert(
        "type".to_string(),
        Value::String(message.message_type.clone()),
    );
    if let Some(channel) = &message.channel {
        tags.insert("channel".to_string(), channel.clone());
    }
    tags.insert("from".to_string(), Value::from(message.from));
    if let Some(sender) = &message.sender {
        tags.insert("sender".to_string(), sender.clone());
    }
    if let Some(timestamp) = &message.timestamp {
        tags.insert("timestamp".to_string(), timestamp.clone());
    }
    if let Some(to) = &message.to {
        tags.insert("to".to_string(), to.clone());
    }
    tags
}

/// Copy the envelope's field-candidate fields into a field map.
///
/// `snr` is coerced to floating point and both `snr` and `rssi` are only
/// included when strictly inside (-200, 200); `rssi` keeps its original
/// numeric type.
pub fn project_fields(message: &MeshMessage) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(hops_away) = message.hops_away {
        fields.insert("hops_away".to_string(), Value::from(hops_away));
    }
    if let Some(id) = message.id {
        fields.insert("id".to_string(), Value::from(id));
    }
    if let Some(rssi) = &message.rssi {
        if rssi.as_f64().is_some_and(within_signal_bounds) {
            fields.insert("rssi".to_string(), Value::Number(rssi.clone()));
        }
    }
    if let Some(snr) = message.snr {
        if within_signal_bounds(snr) {
            fields.insert("snr".to_string(), Value::from(snr));
        }
    }
    fields
}

/// Add the joined node identity onto the tag set
pub fn apply_identity(tags: &mut Map<String, Value>, record: &NodeRecord) {
    tags.insert("hardware".to_string(), Value::from(record.hardware));
    tags.insert(
        "longname".to_string(),
        Value::String(record.longname.clone()),
    );
    tags.insert(
        "shortname".to_string(),
        Value::String(record.shortname.clone()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(raw: serde_json::Value) -> MeshMessage {
        MeshMessage::parse(&serde_json::to_vec(&raw).unwrap()).unwrap()
    }

    #[test]
    fn tags_copied_verbatim_when_present() {
        let msg = message(json!({
            "type": "bme280",
            "from": 42,
            "channel": 0,
            "sender": "!da6bc7f0",
            "timestamp": 1718200000,
            "to": 4294967295i64
        }));

        let tags = project_tags(&msg);
        assert_eq!(tags.get("type"), Some(&json!("bme280")));
        assert_eq!(tags.get("channel"), Some(&json!(0)));
        assert_eq!(tags.get("from"), Some(&json!(42)));
        assert_eq!(tags.get("sender"), Some(&json!("!da6bc7f0")));
        assert_eq!(tags.get("timestamp"), Some(&json!(1718200000)));
        assert_eq!(tags.get("to"), Some(&json!(4294967295i64)));
    }

    #[test]
    fn absent_tags_are_omitted() {
        let msg = message(json!({"type": "bme280", "from": 42}));
        let tags = project_tags(&msg);
        assert_eq!(tags.len(), 2);
        assert!(tags.contains_key("type"));
        assert!(tags.contains_key("from"));
    }

    #[test]
    fn snr_inside_bounds_is_coerced_to_float() {
        let msg = message(json!({"type": "bme280", "from": 42, "snr": 12}));
        let fields = project_fields(&msg);
        assert_eq!(fields.get("snr"), Some(&json!(12.0)));
        assert!(fields.get("snr").unwrap().is_f64());
    }

    #[test]
    fn snr_outside_bounds_is_dropped() {
        for snr in [200.0, -200.0, 999.5, -1000.0] {
            let msg = message(json!({"type": "bme280", "from": 42, "snr": snr}));
            assert!(!project_fields(&msg).contains_key("snr"), "snr {}", snr);
        }
    }

    #[test]
    fn rssi_keeps_original_numeric_type() {
        let msg = message(json!({"type": "bme280", "from": 42, "rssi": -87}));
        let fields = project_fields(&msg);
        assert_eq!(fields.get("rssi"), Some(&json!(-87)));
        assert!(fields.get("rssi").unwrap().is_i64());
    }

    #[test]
    fn rssi_outside_bounds_is_dropped() {
        for rssi in [200, -200, 250, -300] {
            let msg = message(json!({"type": "bme280", "from": 42, "rssi": rssi}));
            assert!(!project_fields(&msg).contains_key("rssi"), "rssi {}", rssi);
        }
    }

    #[test]
    fn boundary_values_just_inside_are_kept() {
        let msg = message(json!({"type": "bme280", "from": 42, "rssi": -199, "snr": 199.9}));
        let fields = project_fields(&msg);
        assert_eq!(fields.get("rssi"), Some(&json!(-199)));
        assert_eq!(fields.get("snr"), Some(&json!(199.9)));
    }

    #[test]
    fn identity_join_adds_node_tags() {
        let mut tags = Map::new();
        apply_identity(
            &mut tags,
            &NodeRecord {
                address: 42,
                hardware: 7,
                longname: "Base".to_string(),
                shortname: "BS".to_string(),
            },
        );
        assert_eq!(tags.get("hardware"), Some(&json!(7)));
        assert_eq!(tags.get("longname"), Some(&json!("Base")));
        assert_eq!(tags.get("shortname"), Some(&json!("BS")));
    }
}
