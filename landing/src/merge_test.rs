use super::*;
use proptest::prelude::*;
use serde_json::json;

use crate::section::{CtaStyle, SectionKey};

#[test]
fn empty_object_yields_base() {
    let base = Theme::default();
    assert_eq!(merge_theme(&base, &json!({})), base);
}

#[test]
fn non_object_blob_yields_base() {
    let base = Theme::preset(Layout::Modern);
    assert_eq!(merge_theme(&base, &json!([1, 2, 3])), base);
    assert_eq!(merge_theme(&base, &Value::Null), base);
}

#[test]
fn present_fields_overwrite_base() {
    let merged = merge_theme(
        &Theme::default(),
        &json!({"primaryColor": "#000000", "fontFamily": "Lora", "backgroundBlur": 8}),
    );
    assert_eq!(merged.primary_color, "#000000");
    assert_eq!(merged.font_family, "Lora");
    assert_eq!(merged.background_blur, 8);
    assert_eq!(merged.secondary_color, Theme::default().secondary_color);
}

#[test]
fn non_numeric_opacity_keeps_default() {
    let merged = merge_theme(&Theme::default(), &json!({"backgroundOpacity": "half"}));
    assert!((merged.background_opacity - 1.0).abs() < f64::EPSILON);

    let merged = merge_theme(&Theme::default(), &json!({"backgroundOpacity": 0.4}));
    assert!((merged.background_opacity - 0.4).abs() < f64::EPSILON);
}

#[test]
fn wrongly_typed_fields_are_treated_as_unset() {
    let merged = merge_theme(
        &Theme::default(),
        &json!({"layout": "brutalist", "textColor": 42, "backgroundBlur": -3, "backgroundImage": "https://x/bg.png"}),
    );
    assert_eq!(merged.layout, Layout::Classic);
    assert_eq!(merged.text_color, Theme::default().text_color);
    assert_eq!(merged.background_blur, 0);
    assert_eq!(merged.background_image.as_deref(), Some("https://x/bg.png"));
}

#[test]
fn out_of_range_values_are_clamped() {
    let merged = merge_theme(&Theme::default(), &json!({"backgroundOpacity": 7, "backgroundBlur": 900}));
    assert!((merged.background_opacity - 1.0).abs() < f64::EPSILON);
    assert_eq!(merged.background_blur, crate::theme::MAX_BACKGROUND_BLUR);
}

#[test]
fn absent_sections_leave_all_defaults() {
    let merged = merge_theme(&Theme::default(), &json!({"primaryColor": "#123456"}));
    assert_eq!(merged.sections, Theme::default().sections);

    let merged = merge_theme(&Theme::default(), &json!({"sections": "nope"}));
    assert_eq!(merged.sections, Theme::default().sections);
}

#[test]
fn unknown_section_keys_are_ignored() {
    let merged = merge_theme(
        &Theme::default(),
        &json!({"sections": {"gallery": {"enabled": false, "order": 1}, "hero": {"enabled": false}}}),
    );
    assert!(!merged.sections.is_enabled(SectionKey::Hero));
    assert_eq!(merged.sections.about, Theme::default().sections.about);
}

#[test]
fn section_config_merges_per_field() {
    let merged = merge_theme(
        &Theme::default(),
        &json!({"sections": {"cta": {"order": 2, "config": {"text": "Let's talk", "style": "outline", "bogus": 1}}}}),
    );
    let cta = &merged.sections.cta;
    assert_eq!(cta.order, 2);
    assert!(cta.enabled);
    assert_eq!(cta.config.text, "Let's talk");
    assert_eq!(cta.config.style, CtaStyle::Outline);
    assert_eq!(cta.config.url, None);
}

#[test]
fn invalid_config_enum_keeps_default_variant() {
    let merged = merge_theme(&Theme::default(), &json!({"sections": {"cta": {"config": {"style": "neon"}}}}));
    assert_eq!(merged.sections.cta.config.style, CtaStyle::Solid);
}

#[test]
fn resolve_uses_preset_of_stored_layout() {
    let theme = resolve_theme(&json!({"layout": "bold", "fontFamily": "Oswald"}));
    assert_eq!(theme.layout, Layout::Bold);
    assert_eq!(theme.primary_color, "#f97316");
    assert_eq!(theme.font_family, "Oswald");
    assert_eq!(theme.sections.cta.config.style, CtaStyle::Gradient);
}

#[test]
fn resolve_accepts_stringified_object() {
    let raw = json!(r##"{"layout":"modern","primaryColor":"#abcdef"}"##);
    let theme = resolve_theme(&raw);
    assert_eq!(theme.layout, Layout::Modern);
    assert_eq!(theme.primary_color, "#abcdef");
}

#[test]
fn parse_stored_theme_falls_back_on_garbage() {
    assert_eq!(parse_stored_theme(None), Theme::default());
    assert_eq!(parse_stored_theme(Some(&Value::Null)), Theme::default());
    assert_eq!(parse_stored_theme(Some(&json!("{not json"))), Theme::default());
    assert_eq!(parse_stored_theme(Some(&json!(12))), Theme::default());
}

#[test]
fn merging_full_theme_json_is_identity() {
    for layout in Layout::ALL {
        let theme = Theme::preset(layout);
        let json = serde_json::to_value(&theme).expect("serialize");
        assert_eq!(resolve_theme(&json), theme);
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

const THEME_FIELDS: &[&str] = &[
    "primaryColor",
    "secondaryColor",
    "backgroundColor",
    "textColor",
    "fontFamily",
    "layout",
    "backgroundImage",
    "backgroundBlur",
    "backgroundOpacity",
    "unknownField",
];

const SECTION_NAMES: &[&str] = &["hero", "about", "stats", "social", "contact", "cta", "gallery"];

const CONFIG_FIELDS: &[&str] = &[
    "headline",
    "showAvatar",
    "title",
    "showBio",
    "maxGalleryItems",
    "showEngagement",
    "style",
    "text",
    "url",
    "buttonText",
    "nonsense",
];

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..100).prop_map(|n| json!(n)),
        (-2.0f64..3.0).prop_map(|f| json!(f)),
        "[a-z#0-9 ]{0,8}".prop_map(Value::String),
        prop::sample::select(vec!["classic", "modern", "bold", "minimal", "solid", "outline", "icons", "buttons"])
            .prop_map(|s| json!(s)),
    ]
}

fn arb_object(fields: &'static [&'static str], value: BoxedStrategy<Value>, max: usize) -> BoxedStrategy<Value> {
    prop::collection::btree_map(prop::sample::select(fields.to_vec()), value, 0..max)
        .prop_map(|map| Value::Object(map.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()))
        .boxed()
}

fn arb_section() -> BoxedStrategy<Value> {
    (
        prop::option::of(arb_leaf()),
        prop::option::of(arb_leaf()),
        prop::option::of(arb_object(CONFIG_FIELDS, arb_leaf().boxed(), 4)),
    )
        .prop_map(|(enabled, order, config)| {
            let mut map = Map::new();
            if let Some(v) = enabled {
                map.insert("enabled".into(), v);
            }
            if let Some(v) = order {
                map.insert("order".into(), v);
            }
            if let Some(v) = config {
                map.insert("config".into(), v);
            }
            Value::Object(map)
        })
        .boxed()
}

fn arb_theme_patch() -> impl Strategy<Value = Value> {
    (
        arb_object(THEME_FIELDS, arb_leaf().boxed(), 6),
        prop::option::of(arb_object(SECTION_NAMES, arb_section(), 4)),
    )
        .prop_map(|(mut top, sections)| {
            if let (Value::Object(map), Some(sections)) = (&mut top, sections) {
                map.insert("sections".into(), sections);
            }
            top
        })
}

proptest! {
    #[test]
    fn merge_is_idempotent(patch in arb_theme_patch()) {
        let base = Theme::default();
        let once = merge_theme(&base, &patch);
        let json = serde_json::to_value(&once).expect("serialize");
        let twice = merge_theme(&base, &json);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn resolve_is_idempotent(patch in arb_theme_patch()) {
        let once = resolve_theme(&patch);
        let json = serde_json::to_value(&once).expect("serialize");
        prop_assert_eq!(resolve_theme(&json), once);
    }

    #[test]
    fn merged_ranges_are_always_valid(patch in arb_theme_patch()) {
        let theme = resolve_theme(&patch);
        prop_assert!((0.0..=1.0).contains(&theme.background_opacity));
        prop_assert!(theme.background_blur <= crate::theme::MAX_BACKGROUND_BLUR);
    }
}
