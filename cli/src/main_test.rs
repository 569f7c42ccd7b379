use super::*;

#[test]
fn ws_url_follows_base_scheme() {
    assert_eq!(ws_url("http://127.0.0.1:3000").expect("http"), "ws://127.0.0.1:3000/api/ws");
    assert_eq!(ws_url("https://hub.example").expect("https"), "wss://hub.example/api/ws");
    assert!(matches!(ws_url("ftp://nope"), Err(CliError::InvalidBaseUrl(_))));
}

#[test]
fn jsonl_line_drops_server_fields() {
    let line = r#"{"id":"x","name":"Ana","approval_status":"approved","instagram_url":"https://instagram.com/ana"}"#;
    let value = parse_jsonl_creator_line(line).expect("parse").expect("creator");
    assert!(value.get("id").is_none());
    assert!(value.get("approval_status").is_none());
    assert_eq!(value["instagram_url"], "https://instagram.com/ana");
}

#[test]
fn jsonl_skips_blank_and_nameless_lines() {
    assert!(parse_jsonl_creator_line("   ").expect("blank").is_none());
    assert!(parse_jsonl_creator_line("[1,2]").expect("array").is_none());
    assert!(parse_jsonl_creator_line(r#"{"name":"  "}"#).expect("empty name").is_none());
    assert!(parse_jsonl_creator_line("{not json").is_err());
}

#[test]
fn request_frames_carry_creator_room() {
    let id = Uuid::new_v4();
    let frame = request_frame("preview:join", Some(id), Value::Object(Map::new()));
    assert_eq!(frame.status, Status::Request);
    assert_eq!(frame.creator_id, Some(id.to_string()));
    assert_eq!(frame.version, frames::FRAME_PROTOCOL_VERSION);
}

#[test]
fn cli_parses_strategy_budget() {
    let cli = Cli::try_parse_from([
        "creatorhub-cli",
        "strategy",
        "budget",
        "00000000-0000-0000-0000-000000000001",
        "--budget",
        "5000",
        "--agency-fee-percent",
        "15",
    ])
    .expect("parse");
    let Command::Strategy(StrategyCommand { command: StrategySubcommand::Budget { budget, tax_percent, .. } }) =
        cli.command
    else {
        panic!("expected strategy budget");
    };
    assert!((budget - 5000.0).abs() < f64::EPSILON);
    assert!(tax_percent.abs() < f64::EPSILON);
}

fn profile() -> landing::CreatorProfile {
    landing::CreatorProfile { name: "Ana Souza".into(), slug: "ana-souza".into(), ..landing::CreatorProfile::default() }
}

#[test]
fn editor_applies_actions_over_stored_theme() {
    let stored = serde_json::json!({"layout": "minimal"});
    let actions = [r#"{"type":"set_layout","layout":"bold"}"#.to_owned()];
    let mut editor = build_editor(&stored, profile(), &actions).expect("editor");
    assert_eq!(editor.theme().layout, landing::Layout::Bold);
    assert!(editor.is_dirty());

    let first = editor.snapshot();
    assert_eq!(first.seq, 1);
    assert_eq!(editor.resend(), first);
}

#[test]
fn editor_rejects_invalid_action() {
    let actions = [r##"{"type":"set_color","slot":"primary","value":"#zzz"}"##.to_owned()];
    let err = build_editor(&Value::Null, profile(), &actions).expect_err("invalid color");
    assert!(matches!(err, CliError::Editor(landing::EditorError::InvalidColor(_))));

    let err = build_editor(&Value::Null, profile(), &["{\"type\":\"nope\"}".to_owned()]).expect_err("unknown action");
    assert!(matches!(err, CliError::InvalidJson(_)));
}

#[test]
fn surface_applies_pushed_snapshot() {
    let mut surface = landing::PreviewSurface::new();
    assert_eq!(surface_summary(&surface), "seq=- layout=- sections=");

    let pushed = landing::PreviewEnvelope::update(4, landing::Theme::preset(landing::Layout::Bold), profile())
        .to_json()
        .expect("encode");
    assert!(apply_snapshot(&mut surface, pushed).expect("apply"));
    let summary = surface_summary(&surface);
    assert!(summary.starts_with("seq=4 layout=bold sections="), "{summary}");
    assert!(summary.contains("hero"), "{summary}");
    assert!(surface.render().is_some_and(|page| page.contains("Ana Souza")));
}

#[test]
fn surface_ignores_ready_and_rejects_other_versions() {
    let mut surface = landing::PreviewSurface::new();
    let ready = landing::PreviewEnvelope::ready().to_json().expect("encode");
    assert!(!apply_snapshot(&mut surface, ready).expect("ready"));

    let mut pushed = landing::PreviewEnvelope::update(1, landing::Theme::default(), profile()).to_json().expect("encode");
    pushed["version"] = serde_json::json!(2);
    let err = apply_snapshot(&mut surface, pushed).expect_err("version");
    assert!(matches!(err, CliError::Preview(landing::PreviewError::UnsupportedVersion { got: 2, .. })));
    assert_eq!(surface.last_seq(), None);
}

#[test]
fn cli_parses_repeatable_push_actions() {
    let cli = Cli::try_parse_from([
        "creatorhub-cli",
        "preview",
        "push",
        "00000000-0000-0000-0000-000000000001",
        "--theme",
        "theme.json",
        "--creator",
        "creator.json",
        "--action",
        r#"{"type":"reset"}"#,
        "--action",
        r#"{"type":"toggle_section","key":"stats"}"#,
        "--follow",
    ])
    .expect("parse");
    let Command::Preview(PreviewCommand { command: PreviewSubcommand::Push { actions, save, follow, .. } }) = cli.command
    else {
        panic!("expected preview push");
    };
    assert_eq!(actions.len(), 2);
    assert!(!save);
    assert!(follow);
}
