//! Strategy change notifications.
//!
//! Subscribers are sockets that show strategy data (calendar, budget panel).
//! After any strategy mutation through the API they receive
//! `strategy:changed {id}` and refetch; the notice carries no state to merge.

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::frame::{Data, Frame};
use crate::state::AppState;

pub const SYSCALL_CHANGED: &str = "strategy:changed";

pub async fn subscribe(state: &AppState, client_id: Uuid, tx: mpsc::Sender<Frame>) {
    state.strategy_subscribers.write().await.insert(client_id, tx);
}

/// Returns true if the client was subscribed.
pub async fn unsubscribe(state: &AppState, client_id: Uuid) -> bool {
    state.strategy_subscribers.write().await.remove(&client_id).is_some()
}

/// Push `strategy:changed` to every subscriber. Returns how many accepted it.
pub async fn notify_strategy_changed(state: &AppState, strategy_id: Uuid) -> usize {
    let frame = Frame::push(SYSCALL_CHANGED, Data::new()).with_data("id", strategy_id.to_string());
    let subscribers = state.strategy_subscribers.read().await;
    let delivered = subscribers.values().filter(|tx| tx.try_send(frame.clone()).is_ok()).count();
    debug!(%strategy_id, delivered, "strategy: change notified");
    delivered
}

#[cfg(test)]
#[path = "realtime_test.rs"]
mod tests;
