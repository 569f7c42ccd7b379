//! Landing-page sections and their per-kind configuration.
//!
//! DESIGN
//! ======
//! The section set is closed: six well-known keys, each carrying only its
//! own config shape. `Sections` stores one typed `Section<C>` per key, so
//! "every key is present" holds by construction and no runtime casts are
//! needed. `SectionConfig` is the owned tagged union used when a caller
//! replaces one config; `SectionConfigRef` is the borrowed view handed to
//! the renderer and the ordering helpers.
//!
//! On the wire a `Sections` value is an object keyed by section name:
//! `{"hero": {"enabled": true, "order": 1, "config": {...}}, ...}`.

#[cfg(test)]
#[path = "section_test.rs"]
mod section_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// KEYS
// =============================================================================

/// Tag identifying one of the well-known landing-page sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Hero,
    About,
    Stats,
    Social,
    Contact,
    Cta,
}

impl SectionKey {
    /// All keys in canonical order. Ordering ties fall back to this order.
    pub const ALL: [Self; 6] = [Self::Hero, Self::About, Self::Stats, Self::Social, Self::Contact, Self::Cta];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::Stats => "stats",
            Self::Social => "social",
            Self::Contact => "contact",
            Self::Cta => "cta",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

// =============================================================================
// CONFIG SHAPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroConfig {
    /// Main heading. Empty falls back to the creator's name.
    pub headline: String,
    pub subheadline: String,
    pub show_avatar: bool,
    pub show_location: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutConfig {
    pub title: String,
    pub show_bio: bool,
    pub show_gallery: bool,
    /// Upper bound on gallery images rendered.
    pub max_gallery_items: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsConfig {
    pub show_total_followers: bool,
    pub show_platform_breakdown: bool,
    pub show_engagement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialStyle {
    Icons,
    Buttons,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialConfig {
    pub title: String,
    pub show_instagram: bool,
    pub show_tiktok: bool,
    pub show_youtube: bool,
    pub style: SocialStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactConfig {
    pub title: String,
    pub show_form: bool,
    pub show_email: bool,
    pub show_whatsapp: bool,
    pub button_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CtaStyle {
    Solid,
    Outline,
    Gradient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaConfig {
    pub text: String,
    /// Link target. `None` points the button at the contact section.
    pub url: Option<String>,
    pub style: CtaStyle,
}

// =============================================================================
// SECTION
// =============================================================================

/// One landing-page block: visibility, position, and typed config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section<C> {
    pub enabled: bool,
    /// 1-based ordering key. Consumers treat it as a dense ranking.
    pub order: u32,
    pub config: C,
}

impl<C> Section<C> {
    #[must_use]
    pub fn new(enabled: bool, order: u32, config: C) -> Self {
        Self { enabled, order, config }
    }
}

/// The full, closed section set of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub hero: Section<HeroConfig>,
    pub about: Section<AboutConfig>,
    pub stats: Section<StatsConfig>,
    pub social: Section<SocialConfig>,
    pub contact: Section<ContactConfig>,
    pub cta: Section<CtaConfig>,
}

impl Sections {
    #[must_use]
    pub fn is_enabled(&self, key: SectionKey) -> bool {
        match key {
            SectionKey::Hero => self.hero.enabled,
            SectionKey::About => self.about.enabled,
            SectionKey::Stats => self.stats.enabled,
            SectionKey::Social => self.social.enabled,
            SectionKey::Contact => self.contact.enabled,
            SectionKey::Cta => self.cta.enabled,
        }
    }

    #[must_use]
    pub fn order_of(&self, key: SectionKey) -> u32 {
        match key {
            SectionKey::Hero => self.hero.order,
            SectionKey::About => self.about.order,
            SectionKey::Stats => self.stats.order,
            SectionKey::Social => self.social.order,
            SectionKey::Contact => self.contact.order,
            SectionKey::Cta => self.cta.order,
        }
    }

    pub fn set_enabled(&mut self, key: SectionKey, enabled: bool) {
        *self.flags_mut(key).0 = enabled;
    }

    pub fn set_order(&mut self, key: SectionKey, order: u32) {
        *self.flags_mut(key).1 = order;
    }

    /// Borrow the config of one section.
    #[must_use]
    pub fn config(&self, key: SectionKey) -> SectionConfigRef<'_> {
        match key {
            SectionKey::Hero => SectionConfigRef::Hero(&self.hero.config),
            SectionKey::About => SectionConfigRef::About(&self.about.config),
            SectionKey::Stats => SectionConfigRef::Stats(&self.stats.config),
            SectionKey::Social => SectionConfigRef::Social(&self.social.config),
            SectionKey::Contact => SectionConfigRef::Contact(&self.contact.config),
            SectionKey::Cta => SectionConfigRef::Cta(&self.cta.config),
        }
    }

    /// Replace the config of the section matching the variant's key.
    pub fn set_config(&mut self, config: SectionConfig) {
        match config {
            SectionConfig::Hero(c) => self.hero.config = c,
            SectionConfig::About(c) => self.about.config = c,
            SectionConfig::Stats(c) => self.stats.config = c,
            SectionConfig::Social(c) => self.social.config = c,
            SectionConfig::Contact(c) => self.contact.config = c,
            SectionConfig::Cta(c) => self.cta.config = c,
        }
    }

    fn flags_mut(&mut self, key: SectionKey) -> (&mut bool, &mut u32) {
        match key {
            SectionKey::Hero => (&mut self.hero.enabled, &mut self.hero.order),
            SectionKey::About => (&mut self.about.enabled, &mut self.about.order),
            SectionKey::Stats => (&mut self.stats.enabled, &mut self.stats.order),
            SectionKey::Social => (&mut self.social.enabled, &mut self.social.order),
            SectionKey::Contact => (&mut self.contact.enabled, &mut self.contact.order),
            SectionKey::Cta => (&mut self.cta.enabled, &mut self.cta.order),
        }
    }
}

// =============================================================================
// TAGGED UNIONS
// =============================================================================

/// Owned config for exactly one section kind.
///
/// Serialized adjacently tagged: `{"section": "cta", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "config", rename_all = "lowercase")]
pub enum SectionConfig {
    Hero(HeroConfig),
    About(AboutConfig),
    Stats(StatsConfig),
    Social(SocialConfig),
    Contact(ContactConfig),
    Cta(CtaConfig),
}

impl SectionConfig {
    #[must_use]
    pub fn key(&self) -> SectionKey {
        match self {
            Self::Hero(_) => SectionKey::Hero,
            Self::About(_) => SectionKey::About,
            Self::Stats(_) => SectionKey::Stats,
            Self::Social(_) => SectionKey::Social,
            Self::Contact(_) => SectionKey::Contact,
            Self::Cta(_) => SectionKey::Cta,
        }
    }
}

/// Borrowed config for one section. Serializes as the bare config object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionConfigRef<'a> {
    Hero(&'a HeroConfig),
    About(&'a AboutConfig),
    Stats(&'a StatsConfig),
    Social(&'a SocialConfig),
    Contact(&'a ContactConfig),
    Cta(&'a CtaConfig),
}

impl SectionConfigRef<'_> {
    #[must_use]
    pub fn to_owned_config(self) -> SectionConfig {
        match self {
            Self::Hero(c) => SectionConfig::Hero(c.clone()),
            Self::About(c) => SectionConfig::About(c.clone()),
            Self::Stats(c) => SectionConfig::Stats(c.clone()),
            Self::Social(c) => SectionConfig::Social(c.clone()),
            Self::Contact(c) => SectionConfig::Contact(c.clone()),
            Self::Cta(c) => SectionConfig::Cta(c.clone()),
        }
    }
}
