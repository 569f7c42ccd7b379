use super::*;
use crate::section::SectionKey;

#[test]
fn default_theme_is_classic_preset() {
    assert_eq!(Theme::default(), Theme::preset(Layout::Classic));
    assert_eq!(Theme::default().layout, Layout::Classic);
}

#[test]
fn presets_have_dense_section_orders() {
    for layout in Layout::ALL {
        let theme = Theme::preset(layout);
        let mut orders: Vec<u32> = SectionKey::ALL
            .iter()
            .map(|key| theme.sections.order_of(*key))
            .collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6], "layout {layout:?}");
    }
}

#[test]
fn minimal_preset_hides_stats_and_cta() {
    let theme = Theme::preset(Layout::Minimal);
    assert!(!theme.sections.is_enabled(SectionKey::Stats));
    assert!(!theme.sections.is_enabled(SectionKey::Cta));
    assert!(theme.sections.is_enabled(SectionKey::Hero));
}

#[test]
fn layout_parse_round_trips_names() {
    for layout in Layout::ALL {
        assert_eq!(Layout::parse(layout.as_str()), Some(layout));
    }
    assert_eq!(Layout::parse("brutalist"), None);
}

#[test]
fn with_preset_style_keeps_sections_and_background() {
    let mut theme = Theme::default();
    theme.background_image = Some("https://cdn.example.com/bg.jpg".into());
    theme.sections.set_enabled(SectionKey::About, false);

    let restyled = theme.with_preset_style(Layout::Bold);
    assert_eq!(restyled.layout, Layout::Bold);
    assert_eq!(restyled.primary_color, "#f97316");
    assert_eq!(restyled.background_image, theme.background_image);
    assert!(!restyled.sections.is_enabled(SectionKey::About));
}

#[test]
fn clamp_ranges_bounds_blur_and_opacity() {
    let mut theme = Theme::default();
    theme.background_blur = 500;
    theme.background_opacity = 3.5;
    theme.clamp_ranges();
    assert_eq!(theme.background_blur, MAX_BACKGROUND_BLUR);
    assert!((theme.background_opacity - 1.0).abs() < f64::EPSILON);

    theme.background_opacity = -0.2;
    theme.clamp_ranges();
    assert!(theme.background_opacity.abs() < f64::EPSILON);
}

#[test]
fn theme_serializes_camel_case_keys() {
    let json = serde_json::to_value(Theme::default()).expect("serialize");
    assert_eq!(json["primaryColor"], "#7c3aed");
    assert_eq!(json["layout"], "classic");
    assert_eq!(json["backgroundImage"], serde_json::Value::Null);
    assert_eq!(json["sections"]["hero"]["order"], 1);
    assert_eq!(json["sections"]["cta"]["config"]["style"], "solid");
}
