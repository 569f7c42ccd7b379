use super::*;

#[test]
fn default_preview_room_is_empty() {
    let room = PreviewRoom::default();
    assert!(room.is_empty());
    assert_eq!(room.seq, 0);
    assert!(room.last_snapshot.is_none());
}

#[test]
fn room_with_only_a_surface_is_not_empty() {
    let mut room = PreviewRoom::default();
    let (tx, _rx) = mpsc::channel(1);
    room.surfaces.insert(Uuid::new_v4(), tx);
    assert!(!room.is_empty());
}

#[tokio::test]
async fn app_state_clones_share_rooms() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    let creator_id = Uuid::new_v4();
    let (_client, _rx) = test_helpers::seed_room_client(&state, creator_id, true).await;

    let rooms = clone.previews.read().await;
    assert_eq!(rooms.get(&creator_id).map(|r| r.surfaces.len()), Some(1));
}

#[tokio::test]
async fn app_state_starts_without_subscribers() {
    let state = test_helpers::test_app_state();
    assert!(state.previews.read().await.is_empty());
    assert!(state.strategy_subscribers.read().await.is_empty());
    assert_eq!(state.settings, RuntimeSettings::default());
}
