//! Landing theme persistence.
//!
//! DESIGN
//! ======
//! The `creators.landing_theme` column holds whatever the editor last wrote:
//! possibly partial, possibly from an older shape, occasionally a JSON
//! string. Reads always go through `landing::parse_stored_theme`, so callers
//! only ever see a complete `Theme`. Writes always store a complete theme,
//! so the column converges to the canonical shape after the first save.
//!
//! Concurrent saves are last-write-wins.

use landing::{Theme, ThemeAction, parse_stored_theme, reduce, resolve_theme};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("creator not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Action(#[from] landing::EditorError),
    #[error("theme encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for ThemeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CREATOR_NOT_FOUND",
            Self::Action(_) => "E_THEME_ACTION_INVALID",
            Self::Encode(_) => "E_THEME_ENCODE",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Load the resolved theme of a creator.
///
/// # Errors
///
/// Returns `NotFound` if the creator does not exist.
pub async fn load_theme(pool: &PgPool, creator_id: Uuid) -> Result<Theme, ThemeError> {
    let row = sqlx::query_as::<_, (Option<Value>,)>("SELECT landing_theme FROM creators WHERE id = $1")
        .bind(creator_id)
        .fetch_optional(pool)
        .await?;
    let Some((stored,)) = row else {
        return Err(ThemeError::NotFound(creator_id));
    };
    Ok(parse_stored_theme(stored.as_ref()))
}

/// Merge a (possibly partial) theme body with defaults and store it.
///
/// # Errors
///
/// Returns `NotFound` if the creator does not exist.
pub async fn save_theme(pool: &PgPool, creator_id: Uuid, body: &Value) -> Result<Theme, ThemeError> {
    let theme = resolve_theme(body);
    store_theme(pool, creator_id, &theme).await?;
    Ok(theme)
}

/// Apply one editor action to the stored theme and store the result.
///
/// # Errors
///
/// Returns `Action` if the action is invalid for the current theme (nothing
/// is written), or `NotFound` if the creator does not exist.
pub async fn apply_action(pool: &PgPool, creator_id: Uuid, action: ThemeAction) -> Result<Theme, ThemeError> {
    let current = load_theme(pool, creator_id).await?;
    let next = reduce(&current, action)?;
    if next != current {
        store_theme(pool, creator_id, &next).await?;
    }
    Ok(next)
}

/// Write a complete theme.
///
/// # Errors
///
/// Returns `NotFound` if no row was updated.
pub async fn store_theme(pool: &PgPool, creator_id: Uuid, theme: &Theme) -> Result<(), ThemeError> {
    let encoded = serde_json::to_value(theme)?;
    let result = sqlx::query("UPDATE creators SET landing_theme = $2, updated_at = now() WHERE id = $1")
        .bind(creator_id)
        .bind(encoded)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ThemeError::NotFound(creator_id));
    }
    info!(%creator_id, layout = theme.layout.as_str(), "landing theme saved");
    Ok(())
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
