use bustrack_core::config::MAX_PAYLOAD_BYTES;
use bustrack_core::error::{BusTrackError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const EVENT_FRAME_TYPE: &str = "event";

/// Client → Server event.
/// Wire: `{ "type": "event", "event": "driver:start", "payload": {...} }`
///
/// `type` may be omitted; `payload` may be omitted for events without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type", default = "event_frame_type")]
    pub frame_type: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

fn event_frame_type() -> String {
    EVENT_FRAME_TYPE.to_string()
}

impl InboundFrame {
    /// Decode one text frame, enforcing the size cap before touching JSON.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() > MAX_PAYLOAD_BYTES {
            return Err(BusTrackError::PayloadTooLarge {
                size: text.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }
        let frame: InboundFrame = serde_json::from_str(text)?;
        if frame.frame_type != EVENT_FRAME_TYPE {
            return Err(BusTrackError::Protocol(format!(
                "unsupported frame type '{}'",
                frame.frame_type
            )));
        }
        Ok(frame)
    }

    /// Deserialize the payload into a typed body; `None` when absent or malformed.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.payload
            .clone()
            .and_then(|p| serde_json::from_value(p).ok())
    }
}

/// Server → Client push event.
/// Wire: `{ "type": "event", "event": "bus:location", "payload": {...}, "seq": 42 }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, payload: impl Serialize) -> Self {
        Self {
            frame_type: EVENT_FRAME_TYPE.to_string(),
            event: event.into(),
            payload: Some(serde_json::to_value(payload).unwrap_or(Value::Null)),
            seq: None,
        }
    }

    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }
}
