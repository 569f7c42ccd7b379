//! WebSocket handler: preview hub and strategy notifications.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → decode + dispatch by syscall prefix
//! - Frames pushed by the hub (snapshots, ready notices, strategy changes)
//!   → forward to client
//!
//! Handler functions validate, call the service, and return an `Outcome`.
//! The dispatch layer turns outcomes into reply frames. Pushes to other
//! sockets happen inside the services (`preview::publish`,
//! `realtime::notify_strategy_changed`).
//!
//! WIRE FORMAT
//! ===========
//! Binary messages are protobuf frames, text messages are JSON frames. The
//! socket answers in the format the client last used; before the first
//! inbound message that is `?format=text` or binary.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. `preview:join` / `strategy:subscribe` register the socket's queue
//! 3. Close → part the preview room, drop the strategy subscription

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use landing::{CreatorProfile, PREVIEW_PROTOCOL_VERSION, resolve_theme};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::frame::{Data, ErrorCode, Frame, Status};
use crate::services::preview::{self, PreviewError, PreviewRole};
use crate::services::realtime;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. Handlers never write to the socket.
enum Outcome {
    /// Send done+data to sender.
    Reply(Data),
    /// Send empty done to sender.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Binary,
    Text,
}

/// Per-connection state.
pub struct Session {
    pub client_id: Uuid,
    pub tx: mpsc::Sender<Frame>,
    pub preview: Option<(Uuid, PreviewRole)>,
    pub strategy_subscribed: bool,
}

impl Session {
    #[must_use]
    pub fn new(client_id: Uuid, tx: mpsc::Sender<Frame>) -> Self {
        Self { client_id, tx, preview: None, strategy_subscribed: false }
    }

    /// Leave the preview room and drop the strategy subscription.
    pub async fn cleanup(&mut self, state: &AppState) {
        self.leave_preview(state).await;
        if self.strategy_subscribed {
            realtime::unsubscribe(state, self.client_id).await;
            self.strategy_subscribed = false;
        }
    }

    async fn leave_preview(&mut self, state: &AppState) {
        if let Some((creator_id, _)) = self.preview.take() {
            preview::part(state, creator_id, self.client_id).await;
        }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let format = match params.get("format").map(String::as_str) {
        Some("text") => WireFormat::Text,
        _ => WireFormat::Binary,
    };
    ws.on_upgrade(move |socket| run_ws(socket, state, format))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, mut format: WireFormat) {
    let client_id = Uuid::new_v4();
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.settings.ws_client_queue);
    let mut session = Session::new(client_id, client_tx);

    let welcome = Frame::push("session:connected", Data::new()).with_data("client_id", client_id.to_string());
    if send_frame(&mut socket, format, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                let replies = match msg {
                    Message::Binary(bytes) => {
                        format = WireFormat::Binary;
                        process_inbound_binary(&state, &mut session, &bytes).await
                    }
                    Message::Text(text) => {
                        format = WireFormat::Text;
                        process_inbound_text(&state, &mut session, text.as_str()).await
                    }
                    Message::Close(_) => break,
                    _ => continue,
                };
                for frame in replies {
                    let _ = send_frame(&mut socket, format, &frame).await;
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, format, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    session.cleanup(&state).await;
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Decode and process one binary (protobuf) frame; returns frames for the sender.
pub async fn process_inbound_binary(state: &AppState, session: &mut Session, bytes: &[u8]) -> Vec<Frame> {
    process_inbound(state, session, frames::decode_frame(bytes)).await
}

/// Decode and process one text (JSON) frame; returns frames for the sender.
pub async fn process_inbound_text(state: &AppState, session: &mut Session, text: &str) -> Vec<Frame> {
    process_inbound(state, session, frames::decode_text_frame(text)).await
}

async fn process_inbound(
    state: &AppState,
    session: &mut Session,
    decoded: Result<frames::Frame, frames::CodecError>,
) -> Vec<Frame> {
    let client_id = session.client_id;
    let wire = match decoded {
        Ok(wire) => wire,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return vec![gateway_error(format!("invalid frame: {e}"), "E_FRAME_DECODE")];
        }
    };
    let mut req = match Frame::try_from(wire) {
        Ok(req) => req,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound frame");
            return vec![gateway_error(e.to_string(), e.error_code())];
        }
    };

    req.from = Some(client_id.to_string());
    info!(%client_id, id = %req.id, syscall = %req.syscall, status = ?req.status, "ws: recv frame");

    let result = match req.prefix() {
        "preview" => handle_preview(state, session, &req).await,
        "strategy" => handle_strategy(state, session, &req).await,
        "session" if req.op() == "ping" => Ok(Outcome::Done),
        prefix => Err(req.error(format!("unknown prefix: {prefix}"))),
    };

    match result {
        Ok(Outcome::Reply(data)) => vec![req.done_with(data)],
        Ok(Outcome::Done) => vec![req.done()],
        Err(err_frame) => vec![err_frame],
    }
}

fn gateway_error(message: String, code: &'static str) -> Frame {
    Frame::push("gateway:error", Data::new())
        .with_data(crate::frame::FRAME_MESSAGE, message)
        .with_data(crate::frame::FRAME_CODE, code)
}

// =============================================================================
// PREVIEW HANDLERS
// =============================================================================

async fn handle_preview(state: &AppState, session: &mut Session, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "join" => {
            let Some(creator_id) = req.creator_id.or_else(|| req.data_uuid("creator_id")) else {
                return Err(req.error("creator_id required"));
            };
            let role = PreviewRole::parse(req.data_str("role").unwrap_or("surface")).map_err(|e| req.error_from(&e))?;

            session.leave_preview(state).await;
            let last = preview::join(state, creator_id, session.client_id, role, session.tx.clone()).await;
            session.preview = Some((creator_id, role));

            let mut data = Data::new();
            data.insert("creator_id".into(), Value::String(creator_id.to_string()));
            data.insert("role".into(), Value::String(role.as_str().into()));
            data.insert("seq".into(), Value::from(last.as_ref().map_or(0, |e| e.seq)));
            if let Some(envelope) = last.filter(|_| role == PreviewRole::Surface) {
                let snapshot = envelope.to_json().map_err(|e| req.error_from(&PreviewError::from(e)))?;
                data.insert("snapshot".into(), snapshot);
            }
            Ok(Outcome::Reply(data))
        }
        "part" => {
            session.leave_preview(state).await;
            Ok(Outcome::Done)
        }
        "update" => {
            let creator_id = joined_as(session, PreviewRole::Editor).map_err(|e| req.error_from(&e))?;
            if let Some(got) = req.data.get("version").and_then(Value::as_u64)
                && got != u64::from(PREVIEW_PROTOCOL_VERSION)
            {
                let err = PreviewError::from(landing::PreviewError::UnsupportedVersion {
                    got,
                    expected: PREVIEW_PROTOCOL_VERSION,
                });
                return Err(req.error_from(&err));
            }
            let theme = resolve_theme(req.data.get("theme").unwrap_or(&Value::Null));
            let Some(raw_creator) = req.data.get("creatorData") else {
                return Err(req.error("creatorData required"));
            };
            let creator: CreatorProfile = serde_json::from_value(raw_creator.clone())
                .map_err(|e| req.error(format!("invalid creatorData: {e}")))?;

            let receipt = preview::publish(state, creator_id, session.client_id, theme, creator)
                .await
                .map_err(|e| req.error_from(&e))?;
            Ok(Outcome::Reply(preview::receipt_data(receipt)))
        }
        "ready" => {
            let creator_id = joined_as(session, PreviewRole::Surface).map_err(|e| req.error_from(&e))?;
            let notified = preview::ready(state, creator_id, session.client_id).await.map_err(|e| req.error_from(&e))?;
            let mut data = Data::new();
            data.insert("notified".into(), Value::from(notified));
            Ok(Outcome::Reply(data))
        }
        op => Err(req.error(format!("unknown preview op: {op}"))),
    }
}

fn joined_as(session: &Session, role: PreviewRole) -> Result<Uuid, PreviewError> {
    match session.preview {
        Some((creator_id, joined)) if joined == role => Ok(creator_id),
        Some((creator_id, _)) => Err(PreviewError::NotJoined(creator_id, role.as_str())),
        None => Err(PreviewError::NotJoined(Uuid::nil(), role.as_str())),
    }
}

// =============================================================================
// STRATEGY HANDLERS
// =============================================================================

async fn handle_strategy(state: &AppState, session: &mut Session, req: &Frame) -> Result<Outcome, Frame> {
    match req.op() {
        "subscribe" => {
            realtime::subscribe(state, session.client_id, session.tx.clone()).await;
            session.strategy_subscribed = true;
            Ok(Outcome::Done)
        }
        "unsubscribe" => {
            realtime::unsubscribe(state, session.client_id).await;
            session.strategy_subscribed = false;
            Ok(Outcome::Done)
        }
        op => Err(req.error(format!("unknown strategy op: {op}"))),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Encode a frame for the socket's current wire format. `None` when the
/// frame cannot be encoded as JSON.
#[must_use]
pub fn encode_message(format: WireFormat, frame: &Frame) -> Option<Message> {
    let wire = frames::Frame::from(frame);
    match format {
        WireFormat::Binary => Some(Message::Binary(frames::encode_frame(&wire).into())),
        WireFormat::Text => match frames::encode_text_frame(&wire) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                warn!(error = %e, "ws: failed to serialize frame");
                None
            }
        },
    }
}

async fn send_frame(socket: &mut WebSocket, format: WireFormat, frame: &Frame) -> Result<(), ()> {
    if frame.status == Status::Error {
        let code = frame.data_str(crate::frame::FRAME_CODE).unwrap_or("-");
        let message = frame.data_str(crate::frame::FRAME_MESSAGE).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }
    let message = encode_message(format, frame).ok_or(())?;
    socket.send(message).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
