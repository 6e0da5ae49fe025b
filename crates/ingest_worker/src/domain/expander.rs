use serde_json::{Map, Value};

use common::{DataPoint, MessagePayload, NeighborInfoPayload};

/// Expand a classified payload into the points for one message.
///
/// Most types yield exactly one point. A neighborinfo payload fans out into
/// one point per neighbor, or a single envelope-only point when the neighbor
/// list is empty. Payload fields merge into the point after the projected
/// envelope fields; a payload-level `id` key never reaches the output.
pub fn expand(
    payload: &MessagePayload,
    tags: Map<String, Value>,
    fields: Map<String, Value>,
) -> Vec<DataPoint> {
    match payload {
        // nodeinfo is routed to the directory before projection ever runs
        MessagePayload::NodeInfo(_) => Vec::new(),
        MessagePayload::Telemetry(map) => {
            let mut point = DataPoint::new();
            point.tags = tags;
            point.fields = fields;
            merge_payload(&mut point.fields, map);
            vec![point]
        }
        MessagePayload::NeighborInfo(info) => expand_neighbors(info, tags, fields),
    }
}

fn merge_payload(fields: &mut Map<String, Value>, payload: &Map<String, Value>) {
    for (key, value) in payload {
        if key == "id" {
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }
}

fn expand_neighbors(
    info: &NeighborInfoPayload,
    tags: Map<String, Value>,
    fields: Map<String, Value>,
) -> Vec<DataPoint> {
    if info.neighbors.is_empty() {
        // Still emit one point so the envelope-level tags are not lost
        let mut point = DataPoint::new();
        point.tags = tags;
        point.fields = fields;
        merge_payload(&mut point.fields, &info.extra);
        return vec![point];
    }

    info.neighbors
        .iter()
        .map(|neighbor| {
            let mut point = DataPoint::new();
            point.tags = tags.clone();
            point.fields = fields.clone();
            merge_payload(&mut point.fields, &info.extra);
            point
                .fields
                .insert("neighbor_node_id".to_string(), Value::from(neighbor.node_id));
            point
                .fields
                .insert("neighbor_snr".to_string(), Value::from(neighbor.snr));
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::NeighborEntry;
    use serde_json::json;

    fn tag_map() -> Map<String, Value> {
        let mut tags = Map::new();
        tags.insert("type".to_string(), json!("neighborinfo"));
        tags.insert("from".to_string(), json!(42));
        tags
    }

    #[test]
    fn telemetry_payload_yields_single_point() {
        let mut payload = Map::new();
        payload.insert("temperature".to_string(), json!(21.5));
        payload.insert("id".to_string(), json!(123456));

        let points = expand(
            &MessagePayload::Telemetry(payload),
            tag_map(),
            Map::new(),
        );

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fields.get("temperature"), Some(&json!(21.5)));
        assert!(!points[0].fields.contains_key("id"));
    }

    #[test]
    fn empty_neighbor_list_still_yields_one_point() {
        let info = NeighborInfoPayload {
            neighbors: vec![],
            extra: Map::new(),
        };

        let points = expand(&MessagePayload::NeighborInfo(info), tag_map(), Map::new());

        assert_eq!(points.len(), 1);
        assert!(!points[0].fields.contains_key("neighbor_node_id"));
        assert!(!points[0].fields.contains_key("neighbor_snr"));
        assert_eq!(points[0].tags.get("from"), Some(&json!(42)));
    }

    #[test]
    fn one_point_per_neighbor() {
        let info = NeighborInfoPayload {
            neighbors: vec![
                NeighborEntry {
                    node_id: 9,
                    snr: 5.25,
                },
                NeighborEntry {
                    node_id: 11,
                    snr: -3.5,
                },
                NeighborEntry {
                    node_id: 13,
                    snr: 0.0,
                },
            ],
            extra: Map::new(),
        };

        let points = expand(&MessagePayload::NeighborInfo(info), tag_map(), Map::new());

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].fields.get("neighbor_node_id"), Some(&json!(9)));
        assert_eq!(points[0].fields.get("neighbor_snr"), Some(&json!(5.25)));
        assert_eq!(points[1].fields.get("neighbor_node_id"), Some(&json!(11)));
        assert_eq!(points[2].fields.get("neighbor_node_id"), Some(&json!(13)));
        // envelope tags repeat on every expanded point
        for point in &points {
            assert_eq!(point.tags.get("from"), Some(&json!(42)));
        }
    }

    #[test]
    fn neighbor_points_carry_remaining_payload_minus_id() {
        let mut extra = Map::new();
        extra.insert("node_broadcast_interval_secs".to_string(), json!(600));
        extra.insert("id".to_string(), json!(77));

        let info = NeighborInfoPayload {
            neighbors: vec![NeighborEntry {
                node_id: 9,
                snr: 5.25,
            }],
            extra,
        };

        let points = expand(&MessagePayload::NeighborInfo(info), tag_map(), Map::new());

        assert_eq!(points.len(), 1);
        assert_eq!(
            points[0].fields.get("node_broadcast_interval_secs"),
            Some(&json!(600))
        );
        assert!(!points[0].fields.contains_key("id"));
    }
}
