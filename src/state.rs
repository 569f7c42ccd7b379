//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the runtime settings, the live preview rooms
//! (one per creator being edited), and the strategy subscribers. Nothing in
//! the rooms is persisted: a room only exists while a socket is in it.

use std::collections::HashMap;
use std::sync::Arc;

use landing::PreviewEnvelope;
use sqlx::PgPool;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::RuntimeSettings;
use crate::frame::Frame;

// =============================================================================
// PREVIEW ROOM
// =============================================================================

/// Live preview state for one creator. Editors publish snapshots; surfaces
/// render them.
#[derive(Default)]
pub struct PreviewRoom {
    /// Editor sockets: client_id -> sender for outgoing frames.
    pub editors: HashMap<Uuid, mpsc::Sender<Frame>>,
    /// Surface sockets: client_id -> sender for outgoing frames.
    pub surfaces: HashMap<Uuid, mpsc::Sender<Frame>>,
    /// Sequence number of the last snapshot published into the room.
    pub seq: u64,
    /// Last snapshot published, replayed to late or re-mounted surfaces.
    pub last_snapshot: Option<PreviewEnvelope>,
}

impl PreviewRoom {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.editors.is_empty() && self.surfaces.is_empty()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: RuntimeSettings,
    /// creator_id -> room.
    pub previews: Arc<RwLock<HashMap<Uuid, PreviewRoom>>>,
    /// client_id -> sender, for `strategy:changed` notices.
    pub strategy_subscribers: Arc<RwLock<HashMap<Uuid, mpsc::Sender<Frame>>>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, settings: RuntimeSettings) -> Self {
        Self {
            pool,
            settings,
            previews: Arc::new(RwLock::new(HashMap::new())),
            strategy_subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
