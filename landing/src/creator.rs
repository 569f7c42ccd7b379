//! Public creator data consumed by the renderer.
//!
//! This is the "creatorData" half of a preview snapshot. Admin-only fields
//! (pricing, approval state) never appear here.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "creator_test.rs"]
mod creator_test;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
}

impl Platform {
    pub const ALL: [Self; 3] = [Self::Instagram, Self::Tiktok, Self::Youtube];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Tiktok => "TikTok",
            Self::Youtube => "YouTube",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Tiktok => "tiktok",
            Self::Youtube => "youtube",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub platform: Platform,
    pub url: Option<String>,
    pub followers: u64,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatorProfile {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    /// Average engagement rate as a percentage.
    pub engagement_rate: Option<f64>,
    pub platforms: Vec<PlatformStats>,
    pub gallery: Vec<String>,
}

impl CreatorProfile {
    /// Sum of followers across active platforms.
    #[must_use]
    pub fn total_followers(&self) -> u64 {
        self.platforms
            .iter()
            .filter(|p| p.active)
            .map(|p| p.followers)
            .fold(0u64, u64::saturating_add)
    }

    /// Stats for one platform, if the creator is active there.
    #[must_use]
    pub fn active_platform(&self, platform: Platform) -> Option<&PlatformStats> {
        self.platforms
            .iter()
            .find(|p| p.platform == platform && p.active)
    }
}
