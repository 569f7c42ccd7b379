//! Merge persisted theme blobs onto preset defaults.
//!
//! DESIGN
//! ======
//! Stored themes are untyped at the boundary: older editors wrote subsets of
//! fields, some values have the wrong JSON type, and a few rows hold the
//! whole blob as a JSON string. The merge walks the stored object one field
//! at a time and keeps a field only if the result still deserializes into
//! the typed value, so a bad field degrades to "unset" instead of poisoning
//! the whole theme. `sections` is merged per key and per config field.
//!
//! INVARIANTS
//! ==========
//! - Output is always a complete `Theme`.
//! - Unknown keys (top-level, section, or config) are ignored.
//! - Idempotent: merging a merged theme's JSON onto the same base is a no-op.

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;

use std::borrow::Cow;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::section::{Section, SectionKey, Sections};
use crate::theme::{Layout, Theme};

/// Overlay `stored` onto `base`, field by field.
#[must_use]
pub fn merge_theme(base: &Theme, stored: &Value) -> Theme {
    let Some(patch) = stored.as_object() else {
        return base.clone();
    };

    let mut theme = overlay_fields(base, patch, &["sections"]);
    if let Some(sections) = patch.get("sections").and_then(Value::as_object) {
        theme.sections = merge_sections(&theme.sections, sections);
    }
    theme.clamp_ranges();
    theme
}

/// Merge a stored blob onto the preset named by its own `layout` field.
///
/// Accepts either a JSON object or a JSON string holding one.
#[must_use]
pub fn resolve_theme(stored: &Value) -> Theme {
    let Some(stored) = unwrap_stringified(stored) else {
        return Theme::default();
    };
    let layout = stored
        .get("layout")
        .and_then(Value::as_str)
        .and_then(Layout::parse)
        .unwrap_or_default();
    merge_theme(&Theme::preset(layout), &stored)
}

/// Resolve an optional stored column value, logging (never returning)
/// malformed input.
#[must_use]
pub fn parse_stored_theme(stored: Option<&Value>) -> Theme {
    match stored {
        None | Some(Value::Null) => Theme::default(),
        Some(value) => {
            if unwrap_stringified(value).is_none() {
                warn!(kind = json_kind(value), "stored landing theme is malformed; using defaults");
            }
            resolve_theme(value)
        }
    }
}

fn unwrap_stringified(stored: &Value) -> Option<Cow<'_, Value>> {
    match stored {
        Value::Object(_) => Some(Cow::Borrowed(stored)),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ Value::Object(_)) => Some(Cow::Owned(parsed)),
            _ => None,
        },
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn merge_sections(base: &Sections, patch: &Map<String, Value>) -> Sections {
    let mut sections = base.clone();
    for key in SectionKey::ALL {
        let Some(entry) = patch.get(key.as_str()).and_then(Value::as_object) else {
            continue;
        };
        match key {
            SectionKey::Hero => sections.hero = merge_section(&base.hero, entry),
            SectionKey::About => sections.about = merge_section(&base.about, entry),
            SectionKey::Stats => sections.stats = merge_section(&base.stats, entry),
            SectionKey::Social => sections.social = merge_section(&base.social, entry),
            SectionKey::Contact => sections.contact = merge_section(&base.contact, entry),
            SectionKey::Cta => sections.cta = merge_section(&base.cta, entry),
        }
    }
    sections
}

fn merge_section<C>(base: &Section<C>, entry: &Map<String, Value>) -> Section<C>
where
    C: Serialize + DeserializeOwned + Clone,
{
    let mut section = overlay_fields(base, entry, &["config"]);
    if let Some(config) = entry.get("config").and_then(Value::as_object) {
        section.config = overlay_fields(&base.config, config, &[]);
    }
    section
}

/// Copy each known field of `patch` onto the JSON form of `base`, keeping a
/// field only if the whole value still deserializes as `T`.
fn overlay_fields<T>(base: &T, patch: &Map<String, Value>, skip: &[&str]) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let Ok(Value::Object(mut fields)) = serde_json::to_value(base) else {
        return base.clone();
    };

    for (key, value) in patch {
        if skip.contains(&key.as_str()) {
            continue;
        }
        let Some(previous) = fields.insert(key.clone(), value.clone()) else {
            // Unknown field: undo the insert.
            fields.remove(key);
            continue;
        };
        if serde_json::from_value::<T>(Value::Object(fields.clone())).is_err() {
            fields.insert(key.clone(), previous);
        }
    }

    serde_json::from_value(Value::Object(fields)).unwrap_or_else(|_| base.clone())
}
