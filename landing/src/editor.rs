//! Theme editor: a pure reducer over immutable `Theme` values plus the
//! in-memory session state that drives saving and preview sync.
//!
//! DESIGN
//! ======
//! Every edit is a `ThemeAction`. `reduce` maps `(Theme, action)` to a new
//! `Theme` or an error and never mutates its input. `ThemeEditor` wraps the
//! reducer with the session bookkeeping the editor UI needs:
//! - the authoritative theme and the last saved baseline (dirty tracking),
//! - a single-flight save slot (a second save while one is in flight is
//!   refused rather than queued),
//! - the last preview snapshot, replayed once when a surface reports ready.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use serde::{Deserialize, Serialize};

use crate::color::normalize_hex_color;
use crate::creator::CreatorProfile;
use crate::order::{ReorderError, reorder_sections};
use crate::preview::PreviewEnvelope;
use crate::section::{SectionConfig, SectionKey};
use crate::theme::{Layout, MAX_BACKGROUND_BLUR, Theme};

// =============================================================================
// ACTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSlot {
    Primary,
    Secondary,
    Background,
    Text,
}

/// Closed set of edits the editor can apply.
///
/// Serialized internally tagged: `{"type": "toggle_section", "key": "stats"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThemeAction {
    SetColor { slot: ColorSlot, value: String },
    SetFontFamily { value: String },
    /// Change only the layout field.
    SetLayout { layout: Layout },
    /// Adopt a preset's colors, font, and layout; sections are kept.
    ApplyPreset { layout: Layout },
    SetBackgroundImage { url: Option<String> },
    SetBackgroundBlur { px: u32 },
    SetBackgroundOpacity { value: f64 },
    ToggleSection { key: SectionKey },
    SetSectionEnabled { key: SectionKey, enabled: bool },
    ReorderSections { from: usize, to: usize },
    UpdateSectionConfig { config: SectionConfig },
    /// Back to the defaults of the current layout.
    Reset,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error("invalid color {0:?}; expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("font family must not be empty")]
    EmptyFontFamily,
    #[error("background blur {0}px exceeds {MAX_BACKGROUND_BLUR}px")]
    BlurOutOfRange(u32),
    #[error("background opacity {0} outside 0.0..=1.0")]
    OpacityOutOfRange(f64),
    #[error("background image must be an http(s) URL")]
    InvalidBackgroundImage,
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    #[error("a save is already in flight")]
    SaveInFlight,
}

// =============================================================================
// REDUCER
// =============================================================================

/// Apply one action to a theme.
///
/// # Errors
///
/// Returns an [`EditorError`] when the action's payload is invalid; the
/// input theme is never modified.
pub fn reduce(theme: &Theme, action: ThemeAction) -> Result<Theme, EditorError> {
    let mut next = theme.clone();
    match action {
        ThemeAction::SetColor { slot, value } => {
            let color = normalize_hex_color(&value).ok_or(EditorError::InvalidColor(value))?;
            match slot {
                ColorSlot::Primary => next.primary_color = color,
                ColorSlot::Secondary => next.secondary_color = color,
                ColorSlot::Background => next.background_color = color,
                ColorSlot::Text => next.text_color = color,
            }
        }
        ThemeAction::SetFontFamily { value } => {
            let value = value.trim();
            if value.is_empty() {
                return Err(EditorError::EmptyFontFamily);
            }
            value.clone_into(&mut next.font_family);
        }
        ThemeAction::SetLayout { layout } => next.layout = layout,
        ThemeAction::ApplyPreset { layout } => next = theme.with_preset_style(layout),
        ThemeAction::SetBackgroundImage { url } => {
            let url = url.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty());
            if let Some(url) = &url
                && !(url.starts_with("https://") || url.starts_with("http://"))
            {
                return Err(EditorError::InvalidBackgroundImage);
            }
            next.background_image = url;
        }
        ThemeAction::SetBackgroundBlur { px } => {
            if px > MAX_BACKGROUND_BLUR {
                return Err(EditorError::BlurOutOfRange(px));
            }
            next.background_blur = px;
        }
        ThemeAction::SetBackgroundOpacity { value } => {
            if !(0.0..=1.0).contains(&value) {
                return Err(EditorError::OpacityOutOfRange(value));
            }
            next.background_opacity = value;
        }
        ThemeAction::ToggleSection { key } => {
            let enabled = next.sections.is_enabled(key);
            next.sections.set_enabled(key, !enabled);
        }
        ThemeAction::SetSectionEnabled { key, enabled } => next.sections.set_enabled(key, enabled),
        ThemeAction::ReorderSections { from, to } => {
            next.sections = reorder_sections(&theme.sections, from, to)?;
        }
        ThemeAction::UpdateSectionConfig { config } => next.sections.set_config(config),
        ThemeAction::Reset => next = Theme::preset(theme.layout),
    }
    Ok(next)
}

// =============================================================================
// EDITOR SESSION
// =============================================================================

/// Editor session state for one creator's theme.
#[derive(Debug, Clone)]
pub struct ThemeEditor {
    theme: Theme,
    saved: Theme,
    creator: CreatorProfile,
    in_flight: Option<Theme>,
    seq: u64,
    last_snapshot: Option<PreviewEnvelope>,
}

impl ThemeEditor {
    #[must_use]
    pub fn new(theme: Theme, creator: CreatorProfile) -> Self {
        Self { saved: theme.clone(), theme, creator, in_flight: None, seq: 0, last_snapshot: None }
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub fn creator(&self) -> &CreatorProfile {
        &self.creator
    }

    /// True when the theme differs from the last successful save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.theme != self.saved
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Apply an action. Returns the snapshot to push to the preview when the
    /// theme actually changed.
    ///
    /// # Errors
    ///
    /// Propagates reducer validation errors; state is unchanged on error.
    pub fn dispatch(&mut self, action: ThemeAction) -> Result<Option<PreviewEnvelope>, EditorError> {
        let next = reduce(&self.theme, action)?;
        if next == self.theme {
            return Ok(None);
        }
        self.theme = next;
        Ok(Some(self.snapshot()))
    }

    /// Replace the creator data shown in the preview.
    pub fn set_creator(&mut self, creator: CreatorProfile) -> PreviewEnvelope {
        self.creator = creator;
        self.snapshot()
    }

    /// Build (and remember) a full-theme snapshot with the next sequence number.
    pub fn snapshot(&mut self) -> PreviewEnvelope {
        self.seq += 1;
        let envelope = PreviewEnvelope::update(self.seq, self.theme.clone(), self.creator.clone());
        self.last_snapshot = Some(envelope.clone());
        envelope
    }

    /// Snapshot to replay after a surface reports ready. Replays the last
    /// pushed snapshot unchanged, or builds the first one.
    pub fn resend(&mut self) -> PreviewEnvelope {
        match &self.last_snapshot {
            Some(envelope) => envelope.clone(),
            None => self.snapshot(),
        }
    }

    /// Claim the save slot and return the theme to persist.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::SaveInFlight`] if a save has not finished yet.
    pub fn begin_save(&mut self) -> Result<Theme, EditorError> {
        if self.in_flight.is_some() {
            return Err(EditorError::SaveInFlight);
        }
        self.in_flight = Some(self.theme.clone());
        Ok(self.theme.clone())
    }

    /// Release the save slot. On success the saved baseline becomes the
    /// theme that was sent, so edits made during the save stay dirty.
    pub fn finish_save(&mut self, succeeded: bool) {
        if let Some(sent) = self.in_flight.take()
            && succeeded
        {
            self.saved = sent;
        }
    }
}
