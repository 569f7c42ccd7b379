//! HTML renderer for creator landing pages.
//!
//! `render_sections` and `render_page` are pure functions of
//! `(Theme, CreatorProfile)`. The public profile route and the preview route
//! both call them, so what the editor previews is what visitors get.
//!
//! SAFETY
//! ======
//! All creator-provided text goes through `escape_html`. Links are emitted
//! only for `http(s)`/`mailto` targets. Theme values that land inside CSS
//! are checked with `is_css_safe`; unsafe colors fall back to the layout
//! preset and unsafe background images are dropped.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use serde::Serialize;

use crate::color::{is_css_safe, rgba};
use crate::creator::{CreatorProfile, Platform};
use crate::order::ordered_sections;
use crate::section::{
    AboutConfig, ContactConfig, CtaConfig, CtaStyle, HeroConfig, SectionConfigRef, SectionKey, SocialConfig,
    SocialStyle, StatsConfig,
};
use crate::theme::Theme;

/// One rendered block of the page, in render order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub key: SectionKey,
    pub html: String,
}

/// Render every enabled section that has something to show.
#[must_use]
pub fn render_sections(theme: &Theme, creator: &CreatorProfile) -> Vec<RenderedSection> {
    ordered_sections(&theme.sections)
        .into_iter()
        .filter_map(|entry| {
            let html = match entry.config {
                SectionConfigRef::Hero(c) => Some(render_hero(c, creator)),
                SectionConfigRef::About(c) => render_about(c, creator),
                SectionConfigRef::Stats(c) => render_stats(c, creator),
                SectionConfigRef::Social(c) => render_social(c, creator),
                SectionConfigRef::Contact(c) => render_contact(c, creator),
                SectionConfigRef::Cta(c) => Some(render_cta(c)),
            }?;
            Some(RenderedSection { key: entry.key, html })
        })
        .collect()
}

/// Render a complete HTML document.
#[must_use]
pub fn render_page(theme: &Theme, creator: &CreatorProfile) -> String {
    let body: String = render_sections(theme, creator)
        .into_iter()
        .map(|section| section.html)
        .collect::<Vec<_>>()
        .join("\n");
    let title = if creator.name.is_empty() { "Creator" } else { creator.name.as_str() };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
{css}
</style>
</head>
<body class="layout-{layout}">
{background}<main class="landing">
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
        css = theme_css(theme),
        layout = theme.layout.as_str(),
        background = background_layer(theme),
    )
}

// =============================================================================
// SECTIONS
// =============================================================================

fn render_hero(config: &HeroConfig, creator: &CreatorProfile) -> String {
    let mut html = String::from(r#"<section id="hero" class="section hero">"#);
    if config.show_avatar
        && let Some(avatar) = creator.avatar_url.as_deref().and_then(safe_href)
    {
        let _ = write!(html, r#"<img class="avatar" src="{}" alt="{}">"#, escape_html(avatar), escape_html(&creator.name));
    }
    let headline = if config.headline.trim().is_empty() { &creator.name } else { &config.headline };
    let _ = write!(html, "<h1>{}</h1>", escape_html(headline));
    if !config.subheadline.is_empty() {
        let _ = write!(html, r#"<p class="subheadline">{}</p>"#, escape_html(&config.subheadline));
    }
    if config.show_location
        && let Some(location) = creator.location.as_deref().filter(|l| !l.is_empty())
    {
        let _ = write!(html, r#"<p class="location">{}</p>"#, escape_html(location));
    }
    html.push_str("</section>");
    html
}

fn render_about(config: &AboutConfig, creator: &CreatorProfile) -> Option<String> {
    let bio = creator.bio.as_deref().filter(|b| config.show_bio && !b.trim().is_empty());
    let limit = usize::try_from(config.max_gallery_items).unwrap_or(usize::MAX);
    let gallery: Vec<&str> = if config.show_gallery {
        creator.gallery.iter().filter_map(|url| safe_href(url)).take(limit).collect()
    } else {
        Vec::new()
    };
    if bio.is_none() && gallery.is_empty() {
        return None;
    }

    let mut html = String::from(r#"<section id="about" class="section about">"#);
    let _ = write!(html, "<h2>{}</h2>", escape_html(&config.title));
    if let Some(bio) = bio {
        let _ = write!(html, r#"<p class="bio">{}</p>"#, escape_html(bio));
    }
    if !gallery.is_empty() {
        html.push_str(r#"<div class="gallery">"#);
        for url in gallery {
            let _ = write!(html, r#"<img src="{}" alt="" loading="lazy">"#, escape_html(url));
        }
        html.push_str("</div>");
    }
    html.push_str("</section>");
    Some(html)
}

fn render_stats(config: &StatsConfig, creator: &CreatorProfile) -> Option<String> {
    let mut items = Vec::new();
    if config.show_total_followers {
        items.push(stat("Followers", &format_compact(creator.total_followers())));
    }
    if config.show_platform_breakdown {
        for platform in Platform::ALL {
            if let Some(stats) = creator.active_platform(platform) {
                items.push(stat(platform.label(), &format_compact(stats.followers)));
            }
        }
    }
    if config.show_engagement
        && let Some(rate) = creator.engagement_rate.filter(|r| r.is_finite())
    {
        items.push(stat("Engagement", &format!("{rate:.1}%")));
    }
    if items.is_empty() {
        return None;
    }
    Some(format!(r#"<section id="stats" class="section stats">{}</section>"#, items.concat()))
}

fn stat(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat"><span class="stat-value">{}</span><span class="stat-label">{}</span></div>"#,
        escape_html(value),
        escape_html(label)
    )
}

fn render_social(config: &SocialConfig, creator: &CreatorProfile) -> Option<String> {
    let shown = |platform: Platform| match platform {
        Platform::Instagram => config.show_instagram,
        Platform::Tiktok => config.show_tiktok,
        Platform::Youtube => config.show_youtube,
    };
    let links: Vec<String> = Platform::ALL
        .into_iter()
        .filter(|p| shown(*p))
        .filter_map(|p| {
            let url = creator.active_platform(p)?.url.as_deref().and_then(safe_href)?;
            let label = match config.style {
                SocialStyle::Icons => String::new(),
                SocialStyle::Buttons => escape_html(p.label()),
            };
            Some(format!(
                r#"<a class="social-link {}" href="{}" aria-label="{}" rel="noopener" target="_blank">{label}</a>"#,
                p.as_str(),
                escape_html(url),
                escape_html(p.label()),
            ))
        })
        .collect();
    if links.is_empty() {
        return None;
    }
    let style = match config.style {
        SocialStyle::Icons => "icons",
        SocialStyle::Buttons => "buttons",
    };
    Some(format!(
        r#"<section id="social" class="section social social-{style}"><h2>{}</h2>{}</section>"#,
        escape_html(&config.title),
        links.concat()
    ))
}

fn render_contact(config: &ContactConfig, creator: &CreatorProfile) -> Option<String> {
    let mut body = String::new();
    if config.show_email
        && let Some(email) = creator.email.as_deref().filter(|e| e.contains('@'))
    {
        let _ = write!(body, r#"<a class="contact-email" href="mailto:{0}">{0}</a>"#, escape_html(email));
    }
    if config.show_whatsapp
        && let Some(number) = creator.whatsapp.as_deref().map(whatsapp_digits).filter(|d| !d.is_empty())
    {
        let _ = write!(body, r#"<a class="contact-whatsapp" href="https://wa.me/{number}">WhatsApp</a>"#);
    }
    if config.show_form {
        let _ = write!(
            body,
            r#"<form class="contact-form" method="post"><input name="name" placeholder="Name"><input name="email" type="email" placeholder="Email"><textarea name="message" placeholder="Message"></textarea><button type="submit">{}</button></form>"#,
            escape_html(&config.button_text)
        );
    }
    if body.is_empty() {
        return None;
    }
    Some(format!(
        r#"<section id="contact" class="section contact"><h2>{}</h2>{body}</section>"#,
        escape_html(&config.title)
    ))
}

fn render_cta(config: &CtaConfig) -> String {
    let href = config.url.as_deref().and_then(safe_href).unwrap_or("#contact");
    let style = match config.style {
        CtaStyle::Solid => "solid",
        CtaStyle::Outline => "outline",
        CtaStyle::Gradient => "gradient",
    };
    format!(
        r#"<section id="cta" class="section cta"><a class="cta-button cta-{style}" href="{}">{}</a></section>"#,
        escape_html(href),
        escape_html(&config.text)
    )
}

// =============================================================================
// STYLE
// =============================================================================

fn theme_css(theme: &Theme) -> String {
    let preset = Theme::preset(theme.layout);
    let pick = |value: &str, fallback: &str| {
        if is_css_safe(value) { value.to_owned() } else { fallback.to_owned() }
    };
    let primary = pick(&theme.primary_color, &preset.primary_color);
    let secondary = pick(&theme.secondary_color, &preset.secondary_color);
    let background = pick(&theme.background_color, &preset.background_color);
    let text = pick(&theme.text_color, &preset.text_color);
    let font = pick(&theme.font_family, &preset.font_family);
    let soft = rgba(&primary, 0.12).unwrap_or_else(|| primary.clone());

    format!(
        ":root {{ --primary: {primary}; --secondary: {secondary}; --bg: {background}; --text: {text}; \
         --primary-soft: {soft}; --font: '{font}', sans-serif; }}\n{BASE_CSS}"
    )
}

fn background_layer(theme: &Theme) -> String {
    let Some(url) = theme.background_image.as_deref().filter(|u| is_css_url_safe(u)) else {
        return String::new();
    };
    format!(
        "<div class=\"backdrop\" style=\"background-image: url('{}'); filter: blur({}px); opacity: {:.2};\"></div>\n",
        escape_html(url),
        theme.background_blur,
        theme.background_opacity.clamp(0.0, 1.0),
    )
}

const BASE_CSS: &str = "\
body { margin: 0; background: var(--bg); color: var(--text); font-family: var(--font); }
.backdrop { position: fixed; inset: 0; background-size: cover; background-position: center; z-index: -1; }
.landing { max-width: 720px; margin: 0 auto; padding: 48px 20px; }
.section { margin-bottom: 40px; text-align: center; }
.avatar { width: 112px; height: 112px; border-radius: 50%; object-fit: cover; }
.gallery { display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; }
.gallery img { width: 100%; aspect-ratio: 1; object-fit: cover; }
.stats { display: flex; justify-content: center; gap: 24px; }
.stat-value { display: block; font-size: 1.5rem; font-weight: 700; color: var(--primary); }
.social-link, .cta-button { display: inline-block; margin: 4px; padding: 10px 20px; border-radius: 999px; text-decoration: none; }
.social-buttons .social-link { background: var(--primary-soft); color: var(--primary); }
.cta-solid { background: var(--primary); color: var(--bg); }
.cta-outline { border: 2px solid var(--primary); color: var(--primary); }
.cta-gradient { background: linear-gradient(90deg, var(--primary), var(--secondary)); color: var(--bg); }
.layout-modern .section { text-align: left; }
.layout-minimal .section { margin-bottom: 24px; }
.layout-bold h1 { font-size: 3rem; text-transform: uppercase; }
";

// =============================================================================
// HELPERS
// =============================================================================

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Compact follower count: `950`, `12.3K`, `1.2M`. Truncates, never rounds up.
#[must_use]
pub fn format_compact(n: u64) -> String {
    fn scaled(n: u64, unit: u64, suffix: char) -> String {
        let tenths = n / (unit / 10);
        let (whole, frac) = (tenths / 10, tenths % 10);
        if frac == 0 { format!("{whole}{suffix}") } else { format!("{whole}.{frac}{suffix}") }
    }
    match n {
        0..1_000 => n.to_string(),
        1_000..1_000_000 => scaled(n, 1_000, 'K'),
        _ => scaled(n, 1_000_000, 'M'),
    }
}

fn safe_href(url: &str) -> Option<&str> {
    let url = url.trim();
    (url.starts_with("https://") || url.starts_with("http://")).then_some(url)
}

fn is_css_url_safe(url: &str) -> bool {
    safe_href(url).is_some() && !url.chars().any(|c| matches!(c, '\'' | '"' | '(' | ')' | '\\' | '<' | '>') || c.is_whitespace())
}

fn whatsapp_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
