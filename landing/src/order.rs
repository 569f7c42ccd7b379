//! Derived section ordering and drag-reorder renumbering.

#[cfg(test)]
#[path = "order_test.rs"]
mod order_test;

use serde::Serialize;

use crate::section::{SectionConfigRef, SectionKey, Sections};

/// One entry of an ordered section list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderedSection<'a> {
    pub key: SectionKey,
    pub enabled: bool,
    pub order: u32,
    pub config: SectionConfigRef<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("section index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Every section, enabled or not, ascending by `order`. Ties keep canonical
/// key order. This is the list the editor's drag handles index into.
#[must_use]
pub fn editor_sections(sections: &Sections) -> Vec<OrderedSection<'_>> {
    let mut list: Vec<OrderedSection<'_>> = SectionKey::ALL
        .into_iter()
        .map(|key| OrderedSection {
            key,
            enabled: sections.is_enabled(key),
            order: sections.order_of(key),
            config: sections.config(key),
        })
        .collect();
    list.sort_by_key(|entry| entry.order);
    list
}

/// Render sequence: enabled sections only, ascending by `order`.
/// Disabled sections are dropped, not rendered hidden.
#[must_use]
pub fn ordered_sections(sections: &Sections) -> Vec<OrderedSection<'_>> {
    editor_sections(sections)
        .into_iter()
        .filter(|entry| entry.enabled)
        .collect()
}

/// Move the entry at `from` to `to` in the editor list and renumber every
/// section to its new 1-based position.
///
/// # Errors
///
/// Returns [`ReorderError::OutOfRange`] if either index is past the end.
pub fn reorder_sections(sections: &Sections, from: usize, to: usize) -> Result<Sections, ReorderError> {
    let mut keys: Vec<SectionKey> = editor_sections(sections).iter().map(|entry| entry.key).collect();
    let len = keys.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::OutOfRange { index, len });
        }
    }

    let moved = keys.remove(from);
    keys.insert(to, moved);
    Ok(renumber(sections, &keys))
}

fn renumber(sections: &Sections, keys: &[SectionKey]) -> Sections {
    let mut out = sections.clone();
    for (position, key) in (1u32..).zip(keys) {
        out.set_order(*key, position);
    }
    out
}
