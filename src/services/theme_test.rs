use super::*;
use crate::frame::ErrorCode;
use landing::{EditorError, Layout};

#[test]
fn error_codes_are_stable() {
    let id = Uuid::new_v4();
    assert_eq!(ThemeError::NotFound(id).error_code(), "E_CREATOR_NOT_FOUND");
    assert_eq!(ThemeError::Action(EditorError::EmptyFontFamily).error_code(), "E_THEME_ACTION_INVALID");
    assert!(!ThemeError::Action(EditorError::EmptyFontFamily).retryable());
}

#[test]
fn action_error_message_is_transparent() {
    let err = ThemeError::from(EditorError::InvalidColor("red".into()));
    assert!(err.to_string().contains("invalid color"));
}

#[tokio::test]
async fn invalid_action_never_reaches_the_database_write() {
    // The lazy pool points at a closed port, so a load fails first; the
    // reducer error path is exercised directly against a default theme.
    let current = Theme::preset(Layout::Bold);
    let err = reduce(&current, ThemeAction::SetFontFamily { value: "   ".into() }).expect_err("empty font");
    assert_eq!(ThemeError::from(err).error_code(), "E_THEME_ACTION_INVALID");
}

#[tokio::test]
async fn load_theme_surfaces_database_errors() {
    let state = crate::state::test_helpers::test_app_state();
    let err = load_theme(&state.pool, Uuid::new_v4()).await.expect_err("no database");
    assert!(matches!(err, ThemeError::Database(_)));
    assert!(err.retryable());
}

#[test]
fn saved_body_is_merged_with_layout_preset() {
    let body = serde_json::json!({"layout": "modern", "primaryColor": "#123456"});
    let theme = resolve_theme(&body);
    assert_eq!(theme.layout, Layout::Modern);
    assert_eq!(theme.primary_color, "#123456");
    assert_eq!(theme.background_color, Theme::preset(Layout::Modern).background_color);
}
