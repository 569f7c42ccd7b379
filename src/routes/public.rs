//! HTML surfaces: the public landing page and the live preview page.
//!
//! Both render through `landing::render_page`; the preview page additionally
//! carries a small script that joins the creator's preview room as a
//! surface and reloads when a newer snapshot arrives.

use axum::extract::{Path, State};
use axum::response::Html;
use landing::{CreatorProfile, PreviewMessage, Theme, parse_stored_theme, render_page};
use uuid::Uuid;

use crate::routes::ApiError;
use crate::services::creator::{self, ApprovalStatus, CreatorError};
use crate::services::preview;
use crate::state::AppState;

const PREVIEW_SCRIPT: &str = r#"<script>
(function () {
  var creatorId = "__CREATOR_ID__";
  var renderedSeq = __SEQ__;
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var ws = new WebSocket(proto + location.host + "/api/ws?format=text");
  function send(syscall, data) {
    ws.send(JSON.stringify({ id: crypto.randomUUID(), syscall: syscall, status: "request", creator_id: creatorId, data: data }));
  }
  function maybeReload(seq) {
    if (typeof seq === "number" && seq > renderedSeq) { location.reload(); }
  }
  ws.onmessage = function (ev) {
    var frame = JSON.parse(ev.data);
    if (frame.syscall === "session:connected") {
      send("preview:join", { creator_id: creatorId, role: "surface" });
    } else if (frame.syscall === "preview:join" && frame.status === "done") {
      maybeReload(frame.data.seq);
      send("preview:ready", { creator_id: creatorId });
    } else if (frame.syscall === "preview:update" && frame.status === "item") {
      maybeReload(frame.data.seq);
    }
  };
})();
</script>"#;

/// Attach the live-reload script for a preview surface.
#[must_use]
pub fn with_preview_script(html: &str, creator_id: Uuid, seq: u64) -> String {
    let script = PREVIEW_SCRIPT.replace("__CREATOR_ID__", &creator_id.to_string()).replace("__SEQ__", &seq.to_string());
    match html.rfind("</body>") {
        Some(at) => format!("{}{script}{}", &html[..at], &html[at..]),
        None => format!("{html}{script}"),
    }
}

/// `GET /p/{key}` — public landing page by slug or id. Only approved
/// creators are public.
pub async fn landing_page(State(state): State<AppState>, Path(key): Path<String>) -> Result<Html<String>, ApiError> {
    let row = creator::find_by_slug_or_id(&state.pool, &key).await?;
    if ApprovalStatus::parse(&row.approval_status) != Some(ApprovalStatus::Approved) {
        return Err(CreatorError::NotFound(key).into());
    }
    let theme = parse_stored_theme(row.landing_theme.as_ref());
    Ok(Html(render_page(&theme, &row.profile())))
}

/// `GET /preview/{creator_id}` — the editor's live snapshot if one exists,
/// otherwise the stored theme.
pub async fn preview_page(
    State(state): State<AppState>,
    Path(creator_id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let (theme, profile, seq) = match preview::snapshot(&state, creator_id).await {
        Some(envelope) => match envelope.message {
            PreviewMessage::UpdatePreview { theme, creator_data } => (*theme, *creator_data, envelope.seq),
            PreviewMessage::PreviewReady => stored_preview(&state, creator_id).await?,
        },
        None => stored_preview(&state, creator_id).await?,
    };
    let page = render_page(&theme, &profile);
    Ok(Html(with_preview_script(&page, creator_id, seq)))
}

async fn stored_preview(state: &AppState, creator_id: Uuid) -> Result<(Theme, CreatorProfile, u64), CreatorError> {
    let row = creator::get_creator(&state.pool, creator_id).await?;
    Ok((parse_stored_theme(row.landing_theme.as_ref()), row.profile(), 0))
}

#[cfg(test)]
#[path = "public_test.rs"]
mod tests;
