//! Wire message model for the panel protocol.
//!
//! Every message on the wire is a single JSON object with a `type` tag, an
//! ISO-8601 UTC timestamp and a free-form `data` payload whose schema varies
//! by type. The `type` field doubles as the correlation key used by
//! [`crate::correlation::Inbox::wait_for`].

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Message type sent by a panel to announce itself.
pub const HEARTBEAT: &str = "panel_heartbeat";
/// Message type carrying a panel's device configuration.
pub const CONFIG: &str = "panel_config";
/// Message type reporting an input device reading.
pub const INPUT: &str = "panel_input";
/// Message type commanding an output device.
pub const OUTPUT: &str = "panel_output";

/// One application message as it appears on the wire.
///
/// Construct via the typed helpers ([`heartbeat`](Self::heartbeat),
/// [`input`](Self::input), [`output`](Self::output)); messages are treated as
/// immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelMessage {
    /// Message type tag; the correlation key.
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-8601 UTC timestamp with a trailing `Z`.
    pub timestamp: String,
    /// Type-specific payload.
    pub data: Map<String, Value>,
}

impl PanelMessage {
    /// Build a message of the given kind with a fresh UTC timestamp.
    #[must_use]
    pub fn new(kind: &str, data: Map<String, Value>) -> Self {
        Self {
            kind: kind.to_owned(),
            timestamp: utc_timestamp(),
            data,
        }
    }

    /// Heartbeat announcing `client_id`, carrying the ping instant.
    #[must_use]
    pub fn heartbeat(client_id: &str) -> Self {
        let data = object(json!({
            "client_id": client_id,
            "ping": utc_timestamp(),
        }));
        Self::new(HEARTBEAT, data)
    }

    /// Input reading for one device, marked as calibrated raw data.
    #[must_use]
    pub fn input(panel_id: &str, device_id: &str, value: f64) -> Self {
        Self::input_with_context(
            panel_id,
            device_id,
            value,
            json!({"raw_value": value, "calibrated": true}),
        )
    }

    /// Input reading with a caller-supplied context object.
    #[must_use]
    pub fn input_with_context(
        panel_id: &str,
        device_id: &str,
        value: f64,
        context: Value,
    ) -> Self {
        let data = object(json!({
            "panel_id": panel_id,
            "device_id": device_id,
            "value": value,
            "context": context,
        }));
        Self::new(INPUT, data)
    }

    /// Output command for one device. `context` is free-form and optional.
    #[must_use]
    pub fn output(
        panel_id: &str,
        device_id: &str,
        command: &str,
        value: Value,
        context: Option<Value>,
    ) -> Self {
        let mut data = object(json!({
            "panel_id": panel_id,
            "device_id": device_id,
            "command": command,
            "value": value,
        }));
        if let Some(ctx) = context {
            data.insert("context".to_owned(), ctx);
        }
        Self::new(OUTPUT, data)
    }

    /// Number of entries in the payload's `devices` array, if present.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.data
            .get("devices")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        // json! brace literals always yield an object.
        _ => Map::new(),
    }
}

/// Current UTC time as ISO-8601 with microsecond precision and a `Z` suffix.
#[must_use]
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_carries_client_id_and_ping() {
        let msg = PanelMessage::heartbeat("helm_main");
        assert_eq!(msg.kind, HEARTBEAT);
        assert_eq!(
            msg.data.get("client_id").and_then(Value::as_str),
            Some("helm_main")
        );
        assert!(msg.data.contains_key("ping"));
    }

    #[test]
    fn timestamps_are_utc_with_z_suffix() {
        let msg = PanelMessage::input("helm_main", "throttle", 0.5);
        assert!(msg.timestamp.ends_with('Z'), "got {}", msg.timestamp);
        assert!(
            chrono::DateTime::parse_from_rfc3339(&msg.timestamp).is_ok(),
            "timestamp should parse as RFC 3339"
        );
    }

    #[test]
    fn input_marks_value_as_calibrated() {
        let msg = PanelMessage::input("helm_main", "rudder", -1.0);
        let ctx = msg.data.get("context").expect("context present");
        assert_eq!(ctx.get("calibrated"), Some(&Value::Bool(true)));
        assert_eq!(ctx.get("raw_value"), msg.data.get("value"));
    }

    #[test]
    fn output_context_is_omitted_when_absent() {
        let msg = PanelMessage::output("helm_main", "engine_led", "blink", json!(500), None);
        assert!(!msg.data.contains_key("context"));
    }

    #[test]
    fn serde_round_trips_through_the_wire_shape() {
        let msg = PanelMessage::output(
            "tactical_weapons",
            "alert_lights",
            "set_all",
            json!([255, 0, 0]),
            Some(json!({"priority": "high"})),
        );
        let text = serde_json::to_string(&msg).expect("serialize");
        assert!(text.contains("\"type\":\"panel_output\""));
        let back: PanelMessage = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, msg);
    }

    #[test]
    fn device_count_reads_the_devices_array() {
        let data = object(json!({"devices": [{}, {}, {}]}));
        let msg = PanelMessage::new(CONFIG, data);
        assert_eq!(msg.device_count(), 3);
        assert_eq!(PanelMessage::heartbeat("x").device_count(), 0);
    }
}
