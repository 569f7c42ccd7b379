//! Typed preview messages between an editor and its preview surfaces.
//!
//! PROTOCOL
//! ========
//! Two message kinds, tagged by `type`:
//! - `UPDATE_PREVIEW {theme, creatorData}`: editor to surface, a full snapshot.
//! - `PREVIEW_READY`: surface to editor, sent once the surface is listening.
//!
//! Every message travels in a `PreviewEnvelope` carrying the protocol
//! `version` and the editor's `seq`. The wire form is flat:
//! `{"version":1,"seq":4,"type":"UPDATE_PREVIEW","theme":{...},"creatorData":{...}}`.
//!
//! Delivery is best-effort. A surface replaces its whole state with each
//! snapshot it receives and does not reorder; the last message applied wins.

#[cfg(test)]
#[path = "preview_test.rs"]
mod preview_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::creator::CreatorProfile;
use crate::render::{RenderedSection, render_page, render_sections};
use crate::theme::Theme;

pub const PREVIEW_PROTOCOL_VERSION: u32 = 1;

/// Delay before the editor replays its last snapshot after `PREVIEW_READY`.
pub const DEFAULT_PREVIEW_RESEND_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreviewMessage {
    UpdatePreview {
        theme: Box<Theme>,
        #[serde(rename = "creatorData")]
        creator_data: Box<CreatorProfile>,
    },
    PreviewReady,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEnvelope {
    pub version: u32,
    pub seq: u64,
    #[serde(flatten)]
    pub message: PreviewMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("unsupported preview protocol version {got} (expected {expected})")]
    UnsupportedVersion { got: u64, expected: u32 },
    #[error("malformed preview message: {0}")]
    Malformed(String),
}

impl PreviewEnvelope {
    #[must_use]
    pub fn update(seq: u64, theme: Theme, creator: CreatorProfile) -> Self {
        Self {
            version: PREVIEW_PROTOCOL_VERSION,
            seq,
            message: PreviewMessage::UpdatePreview { theme: Box::new(theme), creator_data: Box::new(creator) },
        }
    }

    #[must_use]
    pub fn ready() -> Self {
        Self { version: PREVIEW_PROTOCOL_VERSION, seq: 0, message: PreviewMessage::PreviewReady }
    }

    /// Encode to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Malformed`] if serialization fails, which only
    /// happens for non-finite floats in the theme.
    pub fn to_json(&self) -> Result<Value, PreviewError> {
        serde_json::to_value(self).map_err(|e| PreviewError::Malformed(e.to_string()))
    }

    /// Decode from a JSON value, checking the protocol version first.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::UnsupportedVersion`] for a different version
    /// and [`PreviewError::Malformed`] for anything that does not decode.
    pub fn from_json(value: Value) -> Result<Self, PreviewError> {
        let version = value
            .get("version")
            .and_then(Value::as_u64)
            .ok_or_else(|| PreviewError::Malformed("missing version".into()))?;
        if version != u64::from(PREVIEW_PROTOCOL_VERSION) {
            return Err(PreviewError::UnsupportedVersion { got: version, expected: PREVIEW_PROTOCOL_VERSION });
        }
        serde_json::from_value(value).map_err(|e| PreviewError::Malformed(e.to_string()))
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// Rendering state of one preview surface.
#[derive(Debug, Clone, Default)]
pub struct PreviewSurface {
    theme: Option<Theme>,
    creator: Option<CreatorProfile>,
    last_seq: Option<u64>,
}

impl PreviewSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The message a freshly mounted surface sends to its editor.
    #[must_use]
    pub fn announce_ready(&self) -> PreviewEnvelope {
        PreviewEnvelope::ready()
    }

    /// Apply one envelope. Updates replace the entire state; other messages
    /// are ignored. Returns true if the state was replaced.
    pub fn apply(&mut self, envelope: PreviewEnvelope) -> bool {
        match envelope.message {
            PreviewMessage::UpdatePreview { theme, creator_data } => {
                self.theme = Some(*theme);
                self.creator = Some(*creator_data);
                self.last_seq = Some(envelope.seq);
                true
            }
            PreviewMessage::PreviewReady => false,
        }
    }

    #[must_use]
    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    #[must_use]
    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    /// Sections for the current snapshot, or nothing before the first one.
    #[must_use]
    pub fn sections(&self) -> Vec<RenderedSection> {
        match (&self.theme, &self.creator) {
            (Some(theme), Some(creator)) => render_sections(theme, creator),
            _ => Vec::new(),
        }
    }

    /// Full page for the current snapshot.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match (&self.theme, &self.creator) {
            (Some(theme), Some(creator)) => Some(render_page(theme, creator)),
            _ => None,
        }
    }
}
