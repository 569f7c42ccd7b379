use super::*;
use crate::services::preview::PreviewRole;
use crate::state::test_helpers;
use axum::http::StatusCode;
use landing::Layout;
use tokio::sync::mpsc;

#[test]
fn preview_script_is_inserted_before_body_close() {
    let id = Uuid::new_v4();
    let html = with_preview_script("<html><body><main></main></body></html>", id, 4);
    let script_at = html.find("<script>").expect("script");
    let body_close = html.rfind("</body>").expect("body close");
    assert!(script_at < body_close);
    assert!(html.contains(&format!("var creatorId = \"{id}\"")));
    assert!(html.contains("var renderedSeq = 4;"));
}

#[test]
fn preview_script_appends_without_body() {
    let html = with_preview_script("<p>fragment</p>", Uuid::nil(), 0);
    assert!(html.starts_with("<p>fragment</p><script>"));
}

#[tokio::test]
async fn preview_page_renders_live_snapshot() {
    let state = test_helpers::test_app_state();
    let creator_id = Uuid::new_v4();
    let editor = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(4);
    preview::join(&state, creator_id, editor, PreviewRole::Editor, tx).await;
    preview::publish(&state, creator_id, editor, Theme::preset(Layout::Bold), test_helpers::dummy_creator())
        .await
        .expect("publish");

    let Html(page) = preview_page(State(state), Path(creator_id)).await.expect("page");
    assert!(page.contains("class=\"layout-bold\""));
    assert!(page.contains("Ana Souza"));
    assert!(page.contains("var renderedSeq = 1;"));
}

#[tokio::test]
async fn preview_page_without_snapshot_needs_the_database() {
    let state = test_helpers::test_app_state();
    let err = preview_page(State(state), Path(Uuid::new_v4())).await.expect_err("no database");
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
}
