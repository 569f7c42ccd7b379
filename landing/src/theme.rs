//! Theme values and the built-in layout presets.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use serde::{Deserialize, Serialize};

use crate::section::{
    AboutConfig, ContactConfig, CtaConfig, CtaStyle, HeroConfig, Section, Sections, SocialConfig, SocialStyle,
    StatsConfig,
};

/// Largest background blur radius the page will render, in pixels.
pub const MAX_BACKGROUND_BLUR: u32 = 40;

/// Layout preset. Drives the page's structural CSS and the preset defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Classic,
    Modern,
    Minimal,
    Bold,
}

impl Layout {
    pub const ALL: [Self; 4] = [Self::Classic, Self::Modern, Self::Minimal, Self::Bold];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Minimal => "minimal",
            Self::Bold => "bold",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layout| layout.as_str() == raw)
    }
}

/// Serializable configuration of a creator's public landing page.
///
/// This is the persisted `landing_theme` shape (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub layout: Layout,
    pub background_image: Option<String>,
    /// Blur radius in pixels, `0..=MAX_BACKGROUND_BLUR`.
    pub background_blur: u32,
    /// Background image opacity as a fraction, `0.0..=1.0`.
    pub background_opacity: f64,
    pub sections: Sections,
}

impl Default for Theme {
    fn default() -> Self {
        Self::preset(Layout::default())
    }
}

struct Palette {
    primary: &'static str,
    secondary: &'static str,
    background: &'static str,
    text: &'static str,
    font: &'static str,
}

fn palette(layout: Layout) -> Palette {
    match layout {
        Layout::Classic => Palette {
            primary: "#7c3aed",
            secondary: "#ec4899",
            background: "#ffffff",
            text: "#111827",
            font: "Inter",
        },
        Layout::Modern => Palette {
            primary: "#0ea5e9",
            secondary: "#22d3ee",
            background: "#0f172a",
            text: "#f8fafc",
            font: "Poppins",
        },
        Layout::Minimal => Palette {
            primary: "#111111",
            secondary: "#6b7280",
            background: "#fafafa",
            text: "#111111",
            font: "DM Sans",
        },
        Layout::Bold => Palette {
            primary: "#f97316",
            secondary: "#facc15",
            background: "#18181b",
            text: "#fafafa",
            font: "Montserrat",
        },
    }
}

impl Theme {
    /// Full default theme for a layout preset.
    #[must_use]
    pub fn preset(layout: Layout) -> Self {
        let p = palette(layout);
        Self {
            primary_color: p.primary.to_owned(),
            secondary_color: p.secondary.to_owned(),
            background_color: p.background.to_owned(),
            text_color: p.text.to_owned(),
            font_family: p.font.to_owned(),
            layout,
            background_image: None,
            background_blur: 0,
            background_opacity: 1.0,
            sections: Sections::preset(layout),
        }
    }

    /// Take the preset's colors, font, and layout while keeping sections and
    /// background settings.
    #[must_use]
    pub fn with_preset_style(&self, layout: Layout) -> Self {
        let p = palette(layout);
        Self {
            primary_color: p.primary.to_owned(),
            secondary_color: p.secondary.to_owned(),
            background_color: p.background.to_owned(),
            text_color: p.text.to_owned(),
            font_family: p.font.to_owned(),
            layout,
            ..self.clone()
        }
    }

    /// Clamp numeric fields into their documented ranges.
    pub fn clamp_ranges(&mut self) {
        self.background_blur = self.background_blur.min(MAX_BACKGROUND_BLUR);
        if self.background_opacity.is_finite() {
            self.background_opacity = self.background_opacity.clamp(0.0, 1.0);
        } else {
            self.background_opacity = 1.0;
        }
    }
}

impl Sections {
    /// Default section set for a layout. Orders are dense `1..=6`.
    #[must_use]
    pub fn preset(layout: Layout) -> Self {
        let minimal = layout == Layout::Minimal;
        Self {
            hero: Section::new(
                true,
                1,
                HeroConfig {
                    headline: String::new(),
                    subheadline: "Content creator".to_owned(),
                    show_avatar: true,
                    show_location: true,
                },
            ),
            about: Section::new(
                true,
                2,
                AboutConfig { title: "About me".to_owned(), show_bio: true, show_gallery: !minimal, max_gallery_items: 6 },
            ),
            stats: Section::new(
                !minimal,
                3,
                StatsConfig { show_total_followers: true, show_platform_breakdown: true, show_engagement: false },
            ),
            social: Section::new(
                true,
                4,
                SocialConfig {
                    title: "Follow me".to_owned(),
                    show_instagram: true,
                    show_tiktok: true,
                    show_youtube: true,
                    style: if minimal { SocialStyle::Icons } else { SocialStyle::Buttons },
                },
            ),
            contact: Section::new(
                true,
                5,
                ContactConfig {
                    title: "Work with me".to_owned(),
                    show_form: true,
                    show_email: true,
                    show_whatsapp: false,
                    button_text: "Send message".to_owned(),
                },
            ),
            cta: Section::new(
                !minimal,
                6,
                CtaConfig {
                    text: "Book a campaign".to_owned(),
                    url: None,
                    style: if layout == Layout::Bold { CtaStyle::Gradient } else { CtaStyle::Solid },
                },
            ),
        }
    }
}

impl Default for Sections {
    fn default() -> Self {
        Self::preset(Layout::default())
    }
}
