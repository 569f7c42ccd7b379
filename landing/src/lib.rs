//! Landing-page theme model shared by the editor, the preview surface, and
//! the public profile page.
//!
//! This crate owns the persisted `landing_theme` representation (`Theme`),
//! the tolerant merge of stored blobs onto preset defaults, the derived
//! section ordering, the editor reducer, the renderer, and the typed preview
//! messages. Everything here is pure and synchronous; persistence and
//! transport live in the service.

pub mod color;
pub mod creator;
pub mod editor;
pub mod merge;
pub mod order;
pub mod preview;
pub mod render;
pub mod section;
pub mod theme;

pub use creator::{CreatorProfile, Platform, PlatformStats};
pub use editor::{ColorSlot, EditorError, ThemeAction, ThemeEditor, reduce};
pub use merge::{merge_theme, parse_stored_theme, resolve_theme};
pub use order::{OrderedSection, ReorderError, editor_sections, ordered_sections, reorder_sections};
pub use preview::{PREVIEW_PROTOCOL_VERSION, PreviewEnvelope, PreviewError, PreviewMessage, PreviewSurface};
pub use render::{RenderedSection, render_page, render_sections};
pub use section::{
    AboutConfig, ContactConfig, CtaConfig, CtaStyle, HeroConfig, Section, SectionConfig, SectionConfigRef,
    SectionKey, Sections, SocialConfig, SocialStyle, StatsConfig,
};
pub use theme::{Layout, Theme};
