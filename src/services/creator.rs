//! Creator service: roster queries, signup, and duplicate detection.
//!
//! DESIGN
//! ======
//! Creators are stored flat (one column per platform field). The public
//! `CreatorProfile` handed to the renderer and to preview snapshots is built
//! from a row here; admin-only columns (pricing, notes, approval state) stay
//! on `CreatorRow` and are never copied into the profile.
//!
//! DUPLICATES
//! ==========
//! A duplicate candidate is any other creator whose stored Instagram URL
//! contains the handle of the submitted URL, case-insensitively. Substring
//! matching over-matches (`ana` matches `ana_banana`); candidates are a
//! warning for a human, never a rejection. LIKE wildcards in the handle are
//! escaped so the match stays a literal substring.

use landing::{CreatorProfile, Platform, PlatformStats};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CreatorError {
    #[error("creator not found: {0}")]
    NotFound(String),
    #[error("slug {0:?} is already taken by another creator")]
    SlugTaken(String),
    #[error("invalid creator: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error("unknown approval status: {0}")]
    InvalidStatus(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for CreatorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CREATOR_NOT_FOUND",
            Self::SlugTaken(_) => "E_SLUG_TAKEN",
            Self::Invalid(_) => "E_CREATOR_INVALID",
            Self::InvalidStatus(_) => "E_INVALID_STATUS",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Full `creators` row minus timestamps.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CreatorRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub instagram_url: Option<String>,
    pub instagram_followers: i64,
    pub instagram_active: bool,
    pub tiktok_url: Option<String>,
    pub tiktok_followers: i64,
    pub tiktok_active: bool,
    pub youtube_url: Option<String>,
    pub youtube_followers: i64,
    pub youtube_active: bool,
    pub engagement_rate: Option<f64>,
    pub gallery: sqlx::types::Json<Vec<String>>,
    pub price_per_post: Option<f64>,
    pub price_per_reel: Option<f64>,
    pub price_per_story: Option<f64>,
    pub admin_notes: Option<String>,
    pub approval_status: String,
    pub landing_theme: Option<serde_json::Value>,
}

const CREATOR_COLUMNS: &str = "id, name, slug, email, whatsapp, bio, avatar_url, location,
    instagram_url, instagram_followers, instagram_active,
    tiktok_url, tiktok_followers, tiktok_active,
    youtube_url, youtube_followers, youtube_active,
    engagement_rate, gallery, price_per_post, price_per_reel, price_per_story,
    admin_notes, approval_status, landing_theme";

/// Roster entry for list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub approval_status: String,
    pub instagram_url: Option<String>,
    pub total_followers: u64,
}

/// A possible duplicate of a creator being created or edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DuplicateCandidate {
    pub id: Uuid,
    pub name: String,
    pub instagram_url: Option<String>,
}

/// Signup / admin-create payload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewCreator {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 80))]
    pub slug: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub whatsapp: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    #[validate(url)]
    pub instagram_url: Option<String>,
    pub instagram_followers: u32,
    #[validate(url)]
    pub tiktok_url: Option<String>,
    pub tiktok_followers: u32,
    #[validate(url)]
    pub youtube_url: Option<String>,
    pub youtube_followers: u32,
}

// =============================================================================
// PROFILE
// =============================================================================

fn followers(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

impl CreatorRow {
    /// Public profile for rendering. Admin-only columns are not copied.
    #[must_use]
    pub fn profile(&self) -> CreatorProfile {
        let platforms = [
            (Platform::Instagram, &self.instagram_url, self.instagram_followers, self.instagram_active),
            (Platform::Tiktok, &self.tiktok_url, self.tiktok_followers, self.tiktok_active),
            (Platform::Youtube, &self.youtube_url, self.youtube_followers, self.youtube_active),
        ]
        .into_iter()
        .map(|(platform, url, count, active)| PlatformStats {
            platform,
            url: url.clone(),
            followers: followers(count),
            active,
        })
        .collect();

        CreatorProfile {
            id: Some(self.id.to_string()),
            name: self.name.clone(),
            slug: self.slug.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            location: self.location.clone(),
            email: self.email.clone(),
            whatsapp: self.whatsapp.clone(),
            engagement_rate: self.engagement_rate,
            platforms,
            gallery: self.gallery.0.clone(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> CreatorSummary {
        CreatorSummary {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            approval_status: self.approval_status.clone(),
            instagram_url: self.instagram_url.clone(),
            total_followers: self.profile().total_followers(),
        }
    }
}

// =============================================================================
// DUPLICATE DETECTION
// =============================================================================

/// Extract the account handle from an Instagram URL (or a bare handle).
///
/// Takes the last non-empty path segment, ignoring scheme, host, query
/// string, fragment, and trailing slashes, and strips a leading `@`.
/// Returns `None` when nothing is left, including a bare Instagram host.
#[must_use]
pub fn instagram_handle(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let (has_scheme, rest) = match trimmed.split_once("://") {
        Some((_, rest)) => (true, rest),
        None => (false, trimmed),
    };
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let leading_host = segments
        .first()
        .is_some_and(|s| is_instagram_host(s) || ((has_scheme || segments.len() > 1) && s.contains('.')));
    if leading_host {
        segments.remove(0);
    }
    let handle = segments.last()?.trim_start_matches('@').trim();
    if handle.is_empty() { None } else { Some(handle.to_string()) }
}

fn is_instagram_host(segment: &str) -> bool {
    let host = segment.to_ascii_lowercase();
    let host = host.strip_prefix("www.").or_else(|| host.strip_prefix("m.")).unwrap_or(&host);
    matches!(host, "instagram.com" | "instagr.am")
}

/// Escape `\`, `%`, and `_` for a LIKE pattern using `ESCAPE '\'`.
#[must_use]
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Creators whose Instagram URL contains the handle of `instagram_url`.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn check_duplicates(
    pool: &PgPool,
    instagram_url: &str,
    exclude_id: Option<Uuid>,
) -> Result<Vec<DuplicateCandidate>, CreatorError> {
    let Some(handle) = instagram_handle(instagram_url) else {
        return Ok(Vec::new());
    };
    let pattern = format!("%{}%", escape_like(&handle));

    let rows = sqlx::query_as::<_, DuplicateCandidate>(
        r"SELECT id, name, instagram_url
          FROM creators
          WHERE instagram_url ILIKE $1 ESCAPE '\'
            AND ($2::uuid IS NULL OR id <> $2)
          ORDER BY name",
    )
    .bind(pattern)
    .bind(exclude_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// =============================================================================
// SLUGS
// =============================================================================

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// URL slug from a display name: lowercase ASCII words joined by `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// =============================================================================
// QUERIES
// =============================================================================

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| db.is_unique_violation())
}

/// List creators, optionally filtered by approval status.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_creators(pool: &PgPool, status: Option<ApprovalStatus>) -> Result<Vec<CreatorRow>, CreatorError> {
    let sql = format!(
        "SELECT {CREATOR_COLUMNS} FROM creators
         WHERE ($1::text IS NULL OR approval_status = $1)
         ORDER BY name"
    );
    let rows = sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(status.map(ApprovalStatus::as_str))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns `NotFound` if no creator has this id.
pub async fn get_creator(pool: &PgPool, id: Uuid) -> Result<CreatorRow, CreatorError> {
    let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE id = $1");
    sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CreatorError::NotFound(id.to_string()))
}

/// Look up by slug, falling back to the id when `key` parses as a UUID.
///
/// # Errors
///
/// Returns `NotFound` if neither matches.
pub async fn find_by_slug_or_id(pool: &PgPool, key: &str) -> Result<CreatorRow, CreatorError> {
    let id = key.parse::<Uuid>().ok();
    let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE slug = $1 OR ($2::uuid IS NOT NULL AND id = $2) LIMIT 1");
    sqlx::query_as::<_, CreatorRow>(&sql)
        .bind(key)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CreatorError::NotFound(key.to_string()))
}

/// Insert a new creator in `pending` state and report possible duplicates.
///
/// # Errors
///
/// Returns `Invalid` for payload validation failures, `SlugTaken` on a slug
/// unique violation, or a database error.
pub async fn create_creator(
    pool: &PgPool,
    input: NewCreator,
) -> Result<(CreatorRow, Vec<DuplicateCandidate>), CreatorError> {
    input.validate()?;

    let id = Uuid::new_v4();
    let slug = input
        .slug
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(slugify(&input.name)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| id.simple().to_string()[..8].to_string());

    let duplicates = match input.instagram_url.as_deref() {
        Some(url) => check_duplicates(pool, url, None).await?,
        None => Vec::new(),
    };

    let result = sqlx::query(
        "INSERT INTO creators (
            id, name, slug, email, whatsapp, bio, avatar_url, location,
            instagram_url, instagram_followers, instagram_active,
            tiktok_url, tiktok_followers, tiktok_active,
            youtube_url, youtube_followers, youtube_active,
            approval_status
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(&slug)
    .bind(&input.email)
    .bind(&input.whatsapp)
    .bind(&input.bio)
    .bind(&input.avatar_url)
    .bind(&input.location)
    .bind(&input.instagram_url)
    .bind(i64::from(input.instagram_followers))
    .bind(input.instagram_url.is_some())
    .bind(&input.tiktok_url)
    .bind(i64::from(input.tiktok_followers))
    .bind(input.tiktok_url.is_some())
    .bind(&input.youtube_url)
    .bind(i64::from(input.youtube_followers))
    .bind(input.youtube_url.is_some())
    .bind(ApprovalStatus::Pending.as_str())
    .execute(pool)
    .await;

    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(CreatorError::SlugTaken(slug));
        }
        return Err(e.into());
    }

    info!(%id, %slug, duplicates = duplicates.len(), "creator created");
    let row = get_creator(pool, id).await?;
    Ok((row, duplicates))
}

#[cfg(test)]
#[path = "creator_test.rs"]
mod tests;
