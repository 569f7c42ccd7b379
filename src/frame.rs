//! Frame: the message type of the creatorhub realtime socket.
//!
//! ARCHITECTURE
//! ============
//! Clients send request frames over the WebSocket, the server dispatches by
//! syscall prefix (`preview:`, `strategy:`), and answers flow back as
//! item/done/error frames correlated by `parent_id`. Server pushes (preview
//! snapshots, strategy change notices) are `item` frames without a parent.
//!
//! DESIGN
//! ======
//! - Payload is a flat `Map<String, Value>` at the top level.
//! - `creator_id` scopes a frame to one creator's preview room.
//! - On the wire this is `frames::Frame` (protobuf or JSON text); the
//!   conversions below are the only place ids are parsed.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

pub const FRAME_MESSAGE: &str = "message";
pub const FRAME_CODE: &str = "code";
pub const FRAME_RETRYABLE: &str = "retryable";

// =============================================================================
// TYPES
// =============================================================================

pub type Data = HashMap<String, Value>;

/// Every exchange is `request -> item* -> done` or `request -> error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Request,
    Item,
    Done,
    Error,
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    pub ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Uuid>,
    pub from: Option<String>,
    pub syscall: String,
    pub status: Status,
    pub data: Data,
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error frames and
/// REST error bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    #[cfg(test)]
    pub fn request(syscall: impl Into<String>, data: Data) -> Self {
        Self::new(syscall, Status::Request, data)
    }

    /// Server-initiated push. Not correlated to any request.
    pub fn push(syscall: impl Into<String>, data: Data) -> Self {
        Self::new(syscall, Status::Item, data)
    }

    fn new(syscall: impl Into<String>, status: Status, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            ts: now_ms(),
            creator_id: None,
            from: None,
            syscall: syscall.into(),
            status,
            data,
        }
    }

    #[must_use]
    pub fn done(&self) -> Self {
        self.reply(Status::Done, Data::new())
    }

    /// Terminal reply carrying a result payload.
    #[must_use]
    pub fn done_with(&self, data: Data) -> Self {
        self.reply(Status::Done, data)
    }

    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> Self {
        let mut data = Data::new();
        data.insert(FRAME_MESSAGE.into(), Value::String(message.into()));
        self.reply(Status::Error, data)
    }

    #[must_use]
    pub fn error_from(&self, err: &(impl ErrorCode + ?Sized)) -> Self {
        let mut data = Data::new();
        data.insert(FRAME_CODE.into(), Value::String(err.error_code().to_string()));
        data.insert(FRAME_MESSAGE.into(), Value::String(err.to_string()));
        data.insert(FRAME_RETRYABLE.into(), Value::Bool(err.retryable()));
        self.reply(Status::Error, data)
    }

    /// Inherits `parent_id`, `creator_id`, and `syscall` from the request.
    fn reply(&self, status: Status, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: Some(self.id),
            ts: now_ms(),
            creator_id: self.creator_id,
            from: None,
            syscall: self.syscall.clone(),
            status,
            data,
        }
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

impl Frame {
    #[must_use]
    pub fn with_creator_id(mut self, creator_id: Uuid) -> Self {
        self.creator_id = Some(creator_id);
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// ROUTING
// =============================================================================

impl Frame {
    /// Everything before the first ':'.
    #[must_use]
    pub fn prefix(&self) -> &str {
        let Some((prefix, _)) = self.syscall.split_once(':') else {
            return &self.syscall;
        };
        prefix
    }

    /// Everything after the first ':'.
    #[must_use]
    pub fn op(&self) -> &str {
        self.syscall.split_once(':').map_or("", |(_, op)| op)
    }

    /// Read a UUID from the payload.
    #[must_use]
    pub fn data_uuid(&self, key: &str) -> Option<Uuid> {
        self.data.get(key).and_then(Value::as_str).and_then(|s| s.parse().ok())
    }

    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

// =============================================================================
// WIRE CONVERSION
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FrameConversionError {
    #[error("invalid frame id: {0}")]
    InvalidId(String),
    #[error("invalid parent_id: {0}")]
    InvalidParentId(String),
    #[error("invalid creator_id: {0}")]
    InvalidCreatorId(String),
    #[error("frame data must be a JSON object")]
    DataNotObject,
}

impl ErrorCode for FrameConversionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) | Self::InvalidParentId(_) | Self::InvalidCreatorId(_) => "E_FRAME_INVALID_ID",
            Self::DataNotObject => "E_FRAME_INVALID_DATA",
        }
    }
}

impl From<Status> for frames::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Request => Self::Request,
            Status::Item => Self::Item,
            Status::Done => Self::Done,
            Status::Error => Self::Error,
            Status::Cancel => Self::Cancel,
        }
    }
}

impl From<frames::Status> for Status {
    fn from(status: frames::Status) -> Self {
        match status {
            frames::Status::Request => Self::Request,
            frames::Status::Item => Self::Item,
            frames::Status::Done => Self::Done,
            frames::Status::Error => Self::Error,
            frames::Status::Cancel => Self::Cancel,
        }
    }
}

impl From<&Frame> for frames::Frame {
    fn from(frame: &Frame) -> Self {
        Self {
            version: frames::FRAME_PROTOCOL_VERSION,
            id: frame.id.to_string(),
            parent_id: frame.parent_id.map(|id| id.to_string()),
            ts: frame.ts,
            creator_id: frame.creator_id.map(|id| id.to_string()),
            from: frame.from.clone(),
            syscall: frame.syscall.clone(),
            status: frame.status.into(),
            data: Value::Object(frame.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        }
    }
}

impl TryFrom<frames::Frame> for Frame {
    type Error = FrameConversionError;

    fn try_from(wire: frames::Frame) -> Result<Self, Self::Error> {
        let id = wire.id.parse().map_err(|_| FrameConversionError::InvalidId(wire.id.clone()))?;
        let parent_id = parse_optional(wire.parent_id, FrameConversionError::InvalidParentId)?;
        let creator_id = parse_optional(wire.creator_id, FrameConversionError::InvalidCreatorId)?;
        let Value::Object(map) = wire.data else {
            return Err(FrameConversionError::DataNotObject);
        };

        Ok(Self {
            id,
            parent_id,
            ts: wire.ts,
            creator_id,
            from: wire.from,
            syscall: wire.syscall,
            status: wire.status.into(),
            data: map.into_iter().collect(),
        })
    }
}

fn parse_optional(
    raw: Option<String>,
    err: impl FnOnce(String) -> FrameConversionError,
) -> Result<Option<Uuid>, FrameConversionError> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| err(s)),
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
