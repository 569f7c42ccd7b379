//! Frame model and codecs for the creatorhub realtime socket.
//!
//! Frames travel as protobuf (binary WS messages) or as JSON (text WS
//! messages, used by browsers and debugging tools). Payloads stay flexible
//! (`serde_json::Value`); the protobuf form carries them as
//! `google.protobuf.Value`.
//!
//! NUMBERS
//! =======
//! `google.protobuf.Value` has a single double number kind. On decode, whole
//! numbers inside the safe integer range come back as JSON integers so typed
//! payloads (section `order`, follower counts, blur radius) deserialize on
//! the far side.

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version stamped on every frame this crate builds.
pub const FRAME_PROTOCOL_VERSION: u32 = 1;

/// Largest integer a double holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Error returned by the binary and text frame decoders.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Bytes are not a protobuf `WireFrame`.
    #[error("failed to decode protobuf frame: {0}")]
    Decode(#[from] prost::DecodeError),
    /// Text is not a JSON frame, or a payload failed to encode as JSON.
    #[error("failed to decode json frame: {0}")]
    Json(#[from] serde_json::Error),
    /// Wire `status` integer with no matching [`Status`].
    #[error("invalid frame status: {0}")]
    InvalidStatus(i32),
    /// Frame stamped with a version other than [`FRAME_PROTOCOL_VERSION`].
    #[error("unsupported frame version {0} (expected {FRAME_PROTOCOL_VERSION})")]
    UnsupportedVersion(u32),
}

/// Lifecycle status of a frame in a request/response exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Client request opening an exchange.
    Request,
    /// Non-terminal streamed item; also used for server pushes.
    Item,
    /// Successful terminal reply.
    Done,
    /// Failed terminal reply; `data` carries `message` and optionally `code`.
    Error,
    /// Exchange abandoned by either side.
    Cancel,
}

impl Status {
    /// Wire enum integer for this status.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Request => WireFrameStatus::Request as i32,
            Self::Item => WireFrameStatus::Item as i32,
            Self::Done => WireFrameStatus::Done as i32,
            Self::Error => WireFrameStatus::Error as i32,
            Self::Cancel => WireFrameStatus::Cancel as i32,
        }
    }

    fn from_i32(value: i32) -> Result<Self, CodecError> {
        match WireFrameStatus::try_from(value) {
            Ok(WireFrameStatus::Request) => Ok(Self::Request),
            Ok(WireFrameStatus::Item) => Ok(Self::Item),
            Ok(WireFrameStatus::Done) => Ok(Self::Done),
            Ok(WireFrameStatus::Error) => Ok(Self::Error),
            Ok(WireFrameStatus::Cancel) => Ok(Self::Cancel),
            Err(_) => Err(CodecError::InvalidStatus(value)),
        }
    }
}

fn default_version() -> u32 {
    FRAME_PROTOCOL_VERSION
}

/// A single message on the realtime wire protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Protocol version. JSON frames without one are read as the current version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Unique identifier for this frame (UUID string).
    pub id: String,
    /// ID of the request frame this is responding to, if any.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Milliseconds since the Unix epoch when the frame was created.
    #[serde(default)]
    pub ts: i64,
    /// Creator whose preview room this frame belongs to (UUID string).
    #[serde(default)]
    pub creator_id: Option<String>,
    /// Sender label (client id or `"server"`).
    #[serde(default)]
    pub from: Option<String>,
    /// Namespaced operation name, e.g. `"preview:update"`.
    pub syscall: String,
    pub status: Status,
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Encode a frame into protobuf bytes.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    frame_to_wire(frame).encode_to_vec()
}

/// Decode protobuf bytes into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes,
/// [`CodecError::InvalidStatus`] for out-of-range status values, and
/// [`CodecError::UnsupportedVersion`] for frames from another protocol version.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, CodecError> {
    let wire = WireFrame::decode(bytes)?;
    let frame = wire_to_frame(wire)?;
    check_version(frame)
}

/// Encode a frame as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the payload holds a non-finite number.
pub fn encode_text_frame(frame: &Frame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode a JSON text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON and
/// [`CodecError::UnsupportedVersion`] for frames from another protocol version.
pub fn decode_text_frame(text: &str) -> Result<Frame, CodecError> {
    let frame: Frame = serde_json::from_str(text)?;
    check_version(frame)
}

fn check_version(frame: Frame) -> Result<Frame, CodecError> {
    if frame.version == FRAME_PROTOCOL_VERSION {
        Ok(frame)
    } else {
        Err(CodecError::UnsupportedVersion(frame.version))
    }
}

fn frame_to_wire(frame: &Frame) -> WireFrame {
    WireFrame {
        id: frame.id.clone(),
        parent_id: frame.parent_id.clone(),
        ts: frame.ts,
        creator_id: frame.creator_id.clone(),
        from: frame.from.clone(),
        syscall: frame.syscall.clone(),
        status: frame.status.as_i32(),
        data: Some(json_to_proto_value(&frame.data)),
        version: frame.version,
    }
}

fn wire_to_frame(wire: WireFrame) -> Result<Frame, CodecError> {
    Ok(Frame {
        version: wire.version,
        id: wire.id,
        parent_id: wire.parent_id,
        ts: wire.ts,
        creator_id: wire.creator_id,
        from: wire.from,
        syscall: wire.syscall,
        status: Status::from_i32(wire.status)?,
        data: wire.data.map_or_else(empty_object, |v| proto_to_json_value(&v)),
    })
}

fn json_to_proto_value(value: &Value) -> prost_types::Value {
    use prost_types::value::Kind;

    let kind = match value {
        Value::Null => Kind::NullValue(prost_types::NullValue::NullValue as i32),
        Value::Bool(v) => Kind::BoolValue(*v),
        Value::Number(v) => Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => Kind::StringValue(v.clone()),
        Value::Array(v) => Kind::ListValue(prost_types::ListValue { values: v.iter().map(json_to_proto_value).collect() }),
        Value::Object(v) => Kind::StructValue(prost_types::Struct {
            fields: v.iter().map(|(k, v)| (k.clone(), json_to_proto_value(v))).collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

fn proto_to_json_value(value: &prost_types::Value) -> Value {
    use prost_types::value::Kind;

    let Some(kind) = &value.kind else {
        return Value::Null;
    };

    match kind {
        Kind::NullValue(_) => Value::Null,
        Kind::NumberValue(v) => number_to_json(*v),
        Kind::StringValue(v) => Value::String(v.clone()),
        Kind::BoolValue(v) => Value::Bool(*v),
        Kind::StructValue(v) => Value::Object(v.fields.iter().map(|(k, v)| (k.clone(), proto_to_json_value(v))).collect()),
        Kind::ListValue(v) => Value::Array(v.values.iter().map(proto_to_json_value).collect()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_to_json(v: f64) -> Value {
    if v.is_finite() && v.trunc() == v && v.abs() <= MAX_SAFE_INTEGER {
        return Value::from(v as i64);
    }
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[derive(Clone, PartialEq, Message)]
struct WireFrame {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(string, optional, tag = "2")]
    parent_id: Option<String>,
    #[prost(int64, tag = "3")]
    ts: i64,
    #[prost(string, optional, tag = "4")]
    creator_id: Option<String>,
    #[prost(string, optional, tag = "5")]
    from: Option<String>,
    #[prost(string, tag = "6")]
    syscall: String,
    #[prost(enumeration = "WireFrameStatus", tag = "7")]
    status: i32,
    #[prost(message, optional, tag = "8")]
    data: Option<prost_types::Value>,
    #[prost(uint32, tag = "9")]
    version: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireFrameStatus {
    Request = 0,
    Done = 1,
    Error = 2,
    Cancel = 3,
    Item = 4,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
