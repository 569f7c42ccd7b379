//! Preview hub: relays editor snapshots to live preview surfaces.
//!
//! DESIGN
//! ======
//! One room per creator. Editors publish full `UPDATE_PREVIEW` snapshots;
//! the hub stamps each with the room's next `seq`, keeps it as the room's
//! last snapshot, and pushes it to every surface. There is no diffing and no
//! ordering guarantee beyond the channel: a surface renders whatever it
//! received last.
//!
//! HANDSHAKE
//! =========
//! A surface that (re)mounts sends `preview:ready`. The hub forwards that to
//! the editors and schedules exactly one replay of the last snapshot to that
//! surface after `preview_resend_delay`. No further retries.
//!
//! ERROR HANDLING
//! ==============
//! Delivery is best-effort `try_send`; a full or closed surface queue drops
//! the frame. The publisher learns how many surfaces were reached from the
//! `delivered` count.

use landing::{CreatorProfile, PreviewEnvelope, Theme};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::state::AppState;

pub const SYSCALL_UPDATE: &str = "preview:update";
pub const SYSCALL_READY: &str = "preview:ready";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("client has not joined preview room {0} as {1}")]
    NotJoined(Uuid, &'static str),
    #[error("unknown preview role: {0}")]
    InvalidRole(String),
    #[error(transparent)]
    Protocol(#[from] landing::PreviewError),
}

impl crate::frame::ErrorCode for PreviewError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotJoined(..) => "E_PREVIEW_NOT_JOINED",
            Self::InvalidRole(_) => "E_PREVIEW_INVALID_ROLE",
            Self::Protocol(landing::PreviewError::UnsupportedVersion { .. }) => "E_PREVIEW_UNSUPPORTED_VERSION",
            Self::Protocol(landing::PreviewError::Malformed(_)) => "E_PREVIEW_MALFORMED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewRole {
    Editor,
    Surface,
}

impl PreviewRole {
    /// # Errors
    ///
    /// Returns `InvalidRole` for anything but `editor` or `surface`.
    pub fn parse(raw: &str) -> Result<Self, PreviewError> {
        match raw {
            "editor" => Ok(Self::Editor),
            "surface" => Ok(Self::Surface),
            other => Err(PreviewError::InvalidRole(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Surface => "surface",
        }
    }
}

/// What the publisher gets back for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    pub seq: u64,
    pub delivered: usize,
}

// =============================================================================
// FRAMES
// =============================================================================

/// Wrap an envelope into a server push for one room.
///
/// # Errors
///
/// Returns `Protocol` if the envelope does not encode to a JSON object.
pub fn envelope_frame(creator_id: Uuid, envelope: &PreviewEnvelope) -> Result<Frame, PreviewError> {
    let Value::Object(map) = envelope.to_json()? else {
        return Err(landing::PreviewError::Malformed("envelope is not an object".into()).into());
    };
    let syscall = match envelope.message {
        landing::PreviewMessage::UpdatePreview { .. } => SYSCALL_UPDATE,
        landing::PreviewMessage::PreviewReady => SYSCALL_READY,
    };
    Ok(Frame::push(syscall, map.into_iter().collect()).with_creator_id(creator_id))
}

/// Read an envelope back out of a frame payload.
///
/// # Errors
///
/// Returns `Protocol` for a wrong version or an undecodable payload.
pub fn frame_envelope(frame: &Frame) -> Result<PreviewEnvelope, PreviewError> {
    let value = Value::Object(frame.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
    Ok(PreviewEnvelope::from_json(value)?)
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// Add a client to a creator's room. Returns the last snapshot, if any, so
/// a joining surface can render immediately.
pub async fn join(
    state: &AppState,
    creator_id: Uuid,
    client_id: Uuid,
    role: PreviewRole,
    tx: mpsc::Sender<Frame>,
) -> Option<PreviewEnvelope> {
    let mut rooms = state.previews.write().await;
    let room = rooms.entry(creator_id).or_default();
    match role {
        PreviewRole::Editor => room.editors.insert(client_id, tx),
        PreviewRole::Surface => room.surfaces.insert(client_id, tx),
    };
    info!(%creator_id, %client_id, role = role.as_str(), "preview: joined");
    room.last_snapshot.clone()
}

/// Remove a client from a room; the room is evicted once empty.
pub async fn part(state: &AppState, creator_id: Uuid, client_id: Uuid) {
    let mut rooms = state.previews.write().await;
    let Some(room) = rooms.get_mut(&creator_id) else {
        return;
    };
    room.editors.remove(&client_id);
    room.surfaces.remove(&client_id);
    if room.is_empty() {
        rooms.remove(&creator_id);
        info!(%creator_id, "preview: room evicted");
    }
}

/// Last snapshot published into a room.
pub async fn snapshot(state: &AppState, creator_id: Uuid) -> Option<PreviewEnvelope> {
    let rooms = state.previews.read().await;
    rooms.get(&creator_id).and_then(|room| room.last_snapshot.clone())
}

// =============================================================================
// PUBLISH / READY
// =============================================================================

/// Publish a full snapshot from an editor to every surface in the room.
///
/// # Errors
///
/// Returns `NotJoined` if `client_id` is not an editor in the room.
pub async fn publish(
    state: &AppState,
    creator_id: Uuid,
    client_id: Uuid,
    theme: Theme,
    creator: CreatorProfile,
) -> Result<PublishReceipt, PreviewError> {
    let mut rooms = state.previews.write().await;
    let room = rooms
        .get_mut(&creator_id)
        .filter(|room| room.editors.contains_key(&client_id))
        .ok_or(PreviewError::NotJoined(creator_id, PreviewRole::Editor.as_str()))?;

    let seq = room.seq + 1;
    let envelope = PreviewEnvelope::update(seq, theme, creator);
    let frame = envelope_frame(creator_id, &envelope)?;
    room.seq = seq;
    room.last_snapshot = Some(envelope);

    let mut delivered = 0;
    for tx in room.surfaces.values() {
        if tx.try_send(frame.clone()).is_ok() {
            delivered += 1;
        }
    }
    debug!(%creator_id, seq, delivered, "preview: published");
    Ok(PublishReceipt { seq, delivered })
}

/// A surface announced readiness: tell the editors, then replay the last
/// snapshot to that surface once after the configured delay.
///
/// Returns the number of editors notified.
///
/// # Errors
///
/// Returns `NotJoined` if `client_id` is not a surface in the room.
pub async fn ready(state: &AppState, creator_id: Uuid, client_id: Uuid) -> Result<usize, PreviewError> {
    let notified = {
        let rooms = state.previews.read().await;
        let room = rooms
            .get(&creator_id)
            .filter(|room| room.surfaces.contains_key(&client_id))
            .ok_or(PreviewError::NotJoined(creator_id, PreviewRole::Surface.as_str()))?;

        let frame = envelope_frame(creator_id, &PreviewEnvelope::ready())?.with_from(client_id.to_string());
        room.editors.values().filter(|tx| tx.try_send(frame.clone()).is_ok()).count()
    };

    let state = state.clone();
    let delay = state.settings.preview_resend_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        resend_last(&state, creator_id, client_id).await;
    });

    Ok(notified)
}

/// Replay the room's last snapshot to one surface. Returns true if sent.
pub async fn resend_last(state: &AppState, creator_id: Uuid, client_id: Uuid) -> bool {
    let rooms = state.previews.read().await;
    let Some(room) = rooms.get(&creator_id) else {
        return false;
    };
    let (Some(envelope), Some(tx)) = (&room.last_snapshot, room.surfaces.get(&client_id)) else {
        return false;
    };
    let Ok(frame) = envelope_frame(creator_id, envelope) else {
        return false;
    };
    let sent = tx.try_send(frame).is_ok();
    debug!(%creator_id, %client_id, seq = envelope.seq, sent, "preview: resent last snapshot");
    sent
}

/// Build the payload of a `preview:update` reply.
#[must_use]
pub fn receipt_data(receipt: PublishReceipt) -> Data {
    let mut data = Data::new();
    data.insert("seq".into(), Value::from(receipt.seq));
    data.insert("delivered".into(), Value::from(receipt.delivered));
    data
}

#[cfg(test)]
#[path = "preview_test.rs"]
mod tests;
