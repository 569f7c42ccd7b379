use super::*;
use crate::frame::{ErrorCode, Status};
use crate::state::test_helpers;
use landing::{Layout, PreviewMessage, PreviewSurface};
use tokio::time::{Duration, timeout};

async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("frame receive timed out")
        .expect("channel closed unexpectedly")
}

async fn assert_silent(rx: &mut mpsc::Receiver<Frame>, wait_ms: u64) {
    assert!(timeout(Duration::from_millis(wait_ms), rx.recv()).await.is_err(), "expected no frame");
}

async fn join_with_channel(state: &AppState, creator_id: Uuid, role: PreviewRole) -> (Uuid, mpsc::Receiver<Frame>) {
    let client_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(16);
    join(state, creator_id, client_id, role, tx).await;
    (client_id, rx)
}

#[test]
fn role_parses_known_values() {
    assert_eq!(PreviewRole::parse("editor").expect("editor"), PreviewRole::Editor);
    assert_eq!(PreviewRole::parse("surface").expect("surface"), PreviewRole::Surface);
    let err = PreviewRole::parse("viewer").expect_err("unknown role");
    assert_eq!(err.error_code(), "E_PREVIEW_INVALID_ROLE");
}

#[test]
fn envelope_frame_round_trips_through_payload() {
    let creator_id = Uuid::new_v4();
    let envelope = test_helpers::dummy_snapshot(7);
    let frame = envelope_frame(creator_id, &envelope).expect("frame");
    assert_eq!(frame.syscall, SYSCALL_UPDATE);
    assert_eq!(frame.status, Status::Item);
    assert_eq!(frame.creator_id, Some(creator_id));
    assert_eq!(frame.data.get("type"), Some(&Value::from("UPDATE_PREVIEW")));
    assert_eq!(frame_envelope(&frame).expect("envelope"), envelope);
}

#[test]
fn envelope_survives_binary_wire() {
    let creator_id = Uuid::new_v4();
    let envelope = test_helpers::dummy_snapshot(3);
    let frame = envelope_frame(creator_id, &envelope).expect("frame");
    let bytes = frames::encode_frame(&frames::Frame::from(&frame));
    let back = Frame::try_from(frames::decode_frame(&bytes).expect("decode")).expect("convert");
    assert_eq!(frame_envelope(&back).expect("envelope"), envelope);
}

#[test]
fn frame_envelope_rejects_other_versions() {
    let frame = Frame::push(SYSCALL_UPDATE, Data::new()).with_data("version", 9).with_data("type", "PREVIEW_READY");
    let err = frame_envelope(&frame).expect_err("version 9");
    assert_eq!(err.error_code(), "E_PREVIEW_UNSUPPORTED_VERSION");
}

#[tokio::test]
async fn publish_reaches_every_surface_and_counts_deliveries() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let (editor, mut editor_rx) = join_with_channel(&state, creator_id, PreviewRole::Editor).await;
    let (_s1, mut rx1) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;
    let (_s2, mut rx2) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;

    let receipt = publish(&state, creator_id, editor, Theme::preset(Layout::Bold), test_helpers::dummy_creator())
        .await
        .expect("publish");
    assert_eq!(receipt, PublishReceipt { seq: 1, delivered: 2 });

    for rx in [&mut rx1, &mut rx2] {
        let frame = recv(rx).await;
        let envelope = frame_envelope(&frame).expect("envelope");
        assert_eq!(envelope.seq, 1);
        let mut surface = PreviewSurface::new();
        assert!(surface.apply(envelope));
        assert_eq!(surface.theme().map(|t| t.layout), Some(Layout::Bold));
    }
    assert_silent(&mut editor_rx, 50).await;
}

#[tokio::test]
async fn publish_increments_seq_and_keeps_last_snapshot() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let (editor, _rx) = join_with_channel(&state, creator_id, PreviewRole::Editor).await;

    for _ in 0..3 {
        publish(&state, creator_id, editor, Theme::default(), test_helpers::dummy_creator()).await.expect("publish");
    }
    let last = snapshot(&state, creator_id).await.expect("snapshot");
    assert_eq!(last.seq, 3);
    assert!(matches!(last.message, PreviewMessage::UpdatePreview { .. }));
}

#[tokio::test]
async fn publish_requires_editor_membership() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let (surface, _rx) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;

    let err = publish(&state, creator_id, surface, Theme::default(), test_helpers::dummy_creator())
        .await
        .expect_err("surfaces cannot publish");
    assert_eq!(err.error_code(), "E_PREVIEW_NOT_JOINED");
    assert!(snapshot(&state, creator_id).await.is_none());
}

#[tokio::test]
async fn late_surface_receives_last_snapshot_on_join() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let (editor, _rx) = join_with_channel(&state, creator_id, PreviewRole::Editor).await;
    publish(&state, creator_id, editor, Theme::default(), test_helpers::dummy_creator()).await.expect("publish");

    let (tx, _surface_rx) = mpsc::channel(4);
    let existing = join(&state, creator_id, Uuid::new_v4(), PreviewRole::Surface, tx).await;
    assert_eq!(existing.map(|e| e.seq), Some(1));
}

#[tokio::test]
async fn ready_notifies_editors_then_resends_once() {
    let state = test_helpers::test_app_state_with(test_helpers::fast_settings());
    let creator_id = Uuid::new_v4();
    let (editor, mut editor_rx) = join_with_channel(&state, creator_id, PreviewRole::Editor).await;
    let (surface, mut surface_rx) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;

    publish(&state, creator_id, editor, Theme::default(), test_helpers::dummy_creator()).await.expect("publish");
    let first = recv(&mut surface_rx).await;
    assert_eq!(frame_envelope(&first).expect("envelope").seq, 1);

    let notified = ready(&state, creator_id, surface).await.expect("ready");
    assert_eq!(notified, 1);

    let ready_frame = recv(&mut editor_rx).await;
    assert_eq!(ready_frame.syscall, SYSCALL_READY);
    assert_eq!(ready_frame.from.as_deref(), Some(surface.to_string().as_str()));

    let replay = recv(&mut surface_rx).await;
    assert_eq!(frame_envelope(&replay).expect("envelope").seq, 1);
    assert_silent(&mut surface_rx, 100).await;
}

#[tokio::test]
async fn ready_without_snapshot_sends_nothing_back() {
    let state = test_helpers::test_app_state_with(test_helpers::fast_settings());
    let creator_id = Uuid::new_v4();
    let (surface, mut surface_rx) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;

    assert_eq!(ready(&state, creator_id, surface).await.expect("ready"), 0);
    assert_silent(&mut surface_rx, 100).await;
}

#[tokio::test]
async fn ready_requires_surface_membership() {
    let state = test_helpers::test_app_state();
    let err = ready(&state, Uuid::new_v4(), Uuid::new_v4()).await.expect_err("not joined");
    assert!(matches!(err, PreviewError::NotJoined(_, "surface")));
}

#[tokio::test]
async fn part_evicts_empty_rooms_only() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let (editor, _erx) = join_with_channel(&state, creator_id, PreviewRole::Editor).await;
    let (surface, _srx) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;

    part(&state, creator_id, editor).await;
    assert!(state.previews.read().await.contains_key(&creator_id));

    part(&state, creator_id, surface).await;
    assert!(!state.previews.read().await.contains_key(&creator_id));

    part(&state, creator_id, surface).await;
}

#[tokio::test]
async fn closed_surface_is_not_counted() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let (editor, _erx) = join_with_channel(&state, creator_id, PreviewRole::Editor).await;
    let (_gone, gone_rx) = join_with_channel(&state, creator_id, PreviewRole::Surface).await;
    drop(gone_rx);

    let receipt = publish(&state, creator_id, editor, Theme::default(), test_helpers::dummy_creator())
        .await
        .expect("publish");
    assert_eq!(receipt.delivered, 0);
    assert_eq!(receipt_data(receipt).get("seq"), Some(&Value::from(1u64)));
}
