use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};
use frames::{Frame, Status};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("server returned error for {syscall}: {message}")]
    ServerError { syscall: String, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("theme edit rejected: {0}")]
    Editor(#[from] landing::EditorError),
    #[error("preview message: {0}")]
    Preview(#[from] landing::PreviewError),
    #[error("{action} {path}: {source}")]
    Io { action: &'static str, path: String, source: io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "creatorhub-cli", about = "Creator landing pages and campaign planner CLI")]
struct Cli {
    #[arg(long, env = "CREATORHUB_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Creator(CreatorCommand),
    Theme(ThemeCommand),
    Strategy(StrategyCommand),
    Preview(PreviewCommand),
}

#[derive(Args, Debug)]
struct CreatorCommand {
    #[command(subcommand)]
    command: CreatorSubcommand,
}

#[derive(Subcommand, Debug)]
enum CreatorSubcommand {
    List {
        #[arg(long, help = "pending, approved or rejected")]
        status: Option<String>,
    },
    Get {
        #[arg(help = "Creator id or slug")]
        key: String,
    },
    Duplicates {
        #[arg(long)]
        instagram_url: String,
        #[arg(long)]
        exclude_id: Option<Uuid>,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    /// Create one creator per JSON line.
    Import {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
        #[arg(long, default_value_t = 100)]
        progress_every: usize,
    },
}

#[derive(Args, Debug)]
struct ThemeCommand {
    #[command(subcommand)]
    command: ThemeSubcommand,
}

#[derive(Subcommand, Debug)]
enum ThemeSubcommand {
    Get {
        creator_id: Uuid,
    },
    Put {
        creator_id: Uuid,
        #[arg(long, help = "Theme JSON file, or - for stdin")]
        file: String,
    },
    /// Apply one editor action, e.g. `{"type":"set_layout","layout":"bold"}`.
    Action {
        creator_id: Uuid,
        #[arg(long)]
        data: String,
    },
    Sections {
        creator_id: Uuid,
    },
    /// Render a landing page locally without a server.
    Render {
        #[arg(long, help = "Stored theme JSON file")]
        theme: String,
        #[arg(long, help = "Creator profile JSON file")]
        creator: String,
    },
}

#[derive(Args, Debug)]
struct StrategyCommand {
    #[command(subcommand)]
    command: StrategySubcommand,
}

#[derive(Subcommand, Debug)]
enum StrategySubcommand {
    Companies,
    List {
        #[arg(long)]
        company_id: Option<Uuid>,
    },
    Get {
        strategy_id: Uuid,
    },
    Budget {
        strategy_id: Uuid,
        #[arg(long)]
        budget: f64,
        #[arg(long, default_value_t = 0.0)]
        agency_fee_percent: f64,
        #[arg(long, default_value_t = 0.0)]
        tax_percent: f64,
    },
    AddDeliverable {
        strategy_id: Uuid,
        #[arg(long)]
        data: String,
    },
    SetQuantity {
        strategy_id: Uuid,
        item_id: Uuid,
        #[arg(long)]
        quantity: u32,
    },
    RemoveDeliverable {
        strategy_id: Uuid,
        item_id: Uuid,
    },
    FlyerSlots {
        strategy_id: Uuid,
        #[arg(long, help = "JSON array of slots, or - for stdin")]
        file: String,
    },
    /// Print `strategy:changed` notices until interrupted.
    Watch,
}

#[derive(Args, Debug)]
struct PreviewCommand {
    #[command(subcommand)]
    command: PreviewSubcommand,
}

#[derive(Subcommand, Debug)]
enum PreviewSubcommand {
    /// Publish one snapshot as an editor.
    Push {
        creator_id: Uuid,
        #[arg(long, help = "Stored theme JSON file")]
        theme: String,
        #[arg(long, help = "Creator profile JSON file")]
        creator: String,
        #[arg(long = "action", help = "Editor action JSON applied before publishing; repeatable")]
        actions: Vec<String>,
        #[arg(long, help = "Persist the edited theme after publishing")]
        save: bool,
        #[arg(long, help = "Stay joined and replay the snapshot when a surface reports ready")]
        follow: bool,
    },
    /// Join as a surface and print snapshots as they arrive.
    Watch {
        creator_id: Uuid,
        #[arg(long, help = "Stop after this many snapshots")]
        count: Option<usize>,
        #[arg(long, help = "Rewrite this file with the rendered page after each snapshot")]
        html: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url.trim_end_matches('/').to_owned();

    match cli.command {
        Command::Ping => run_ping(&base_url).await,
        Command::Creator(creator) => run_creator(&base_url, creator).await,
        Command::Theme(theme) => run_theme(&base_url, theme).await,
        Command::Strategy(strategy) => run_strategy(&base_url, strategy).await,
        Command::Preview(preview) => run_preview(&base_url, preview).await,
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(format!("{base_url}/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError {
            syscall: format!("HTTP {}", status.as_u16()),
            message: "health check failed".to_owned(),
        });
    }
    println!("ok");
    Ok(())
}

// =============================================================================
// REST COMMANDS
// =============================================================================

async fn run_creator(base_url: &str, creator: CreatorCommand) -> Result<(), CliError> {
    let json = match creator.command {
        CreatorSubcommand::List { status } => {
            let query: Vec<(&str, String)> = status.map(|s| ("status", s)).into_iter().collect();
            api_request(base_url, reqwest::Method::GET, "/api/creators", &query, None).await?
        }
        CreatorSubcommand::Get { key } => {
            api_request(base_url, reqwest::Method::GET, &format!("/api/creators/{key}"), &[], None).await?
        }
        CreatorSubcommand::Duplicates { instagram_url, exclude_id } => {
            let mut query = vec![("instagram_url", instagram_url)];
            if let Some(id) = exclude_id {
                query.push(("exclude_id", id.to_string()));
            }
            api_request(base_url, reqwest::Method::GET, "/api/creators/duplicates", &query, None).await?
        }
        CreatorSubcommand::Create { data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            api_request(base_url, reqwest::Method::POST, "/api/creators", &[], Some(body)).await?
        }
        CreatorSubcommand::Import { input, progress_every } => {
            return import_creators(base_url, &input, progress_every).await;
        }
    };
    print_json(&json)
}

async fn import_creators(base_url: &str, input: &str, progress_every: usize) -> Result<(), CliError> {
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(input).map_err(|source| CliError::Io { action: "open", path: input.to_owned(), source })?;
        Box::new(BufReader::new(file))
    };

    let mut created = 0_usize;
    let mut skipped = 0_usize;
    let mut failed = 0_usize;
    for line in reader.lines() {
        let line = line.map_err(|source| CliError::Io { action: "read", path: input.to_owned(), source })?;
        let Some(payload) = parse_jsonl_creator_line(&line)? else {
            skipped = skipped.saturating_add(1);
            continue;
        };
        match api_request(base_url, reqwest::Method::POST, "/api/creators", &[], Some(payload)).await {
            Ok(_) => created = created.saturating_add(1),
            Err(CliError::ServerError { message, .. }) => {
                failed = failed.saturating_add(1);
                eprintln!("rejected: {message}");
            }
            Err(other) => return Err(other),
        }
        if progress_every > 0 && created > 0 && created.is_multiple_of(progress_every) {
            eprintln!("imported {created} creators...");
        }
    }

    eprintln!("creator import complete: created={created} skipped={skipped} rejected={failed}");
    Ok(())
}

async fn run_theme(base_url: &str, theme: ThemeCommand) -> Result<(), CliError> {
    let json = match theme.command {
        ThemeSubcommand::Get { creator_id } => {
            let path = format!("/api/creators/{creator_id}/theme");
            api_request(base_url, reqwest::Method::GET, &path, &[], None).await?
        }
        ThemeSubcommand::Put { creator_id, file } => {
            let body = read_json(&file)?;
            let path = format!("/api/creators/{creator_id}/theme");
            api_request(base_url, reqwest::Method::PUT, &path, &[], Some(body)).await?
        }
        ThemeSubcommand::Action { creator_id, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            let path = format!("/api/creators/{creator_id}/theme/actions");
            api_request(base_url, reqwest::Method::POST, &path, &[], Some(body)).await?
        }
        ThemeSubcommand::Sections { creator_id } => {
            let path = format!("/api/creators/{creator_id}/sections");
            api_request(base_url, reqwest::Method::GET, &path, &[], None).await?
        }
        ThemeSubcommand::Render { theme, creator } => {
            let stored = read_json(&theme)?;
            let profile: landing::CreatorProfile = serde_json::from_value(read_json(&creator)?)?;
            println!("{}", landing::render_page(&landing::resolve_theme(&stored), &profile));
            return Ok(());
        }
    };
    print_json(&json)
}

async fn run_strategy(base_url: &str, strategy: StrategyCommand) -> Result<(), CliError> {
    let json = match strategy.command {
        StrategySubcommand::Companies => {
            api_request(base_url, reqwest::Method::GET, "/api/companies", &[], None).await?
        }
        StrategySubcommand::List { company_id } => {
            let query: Vec<(&str, String)> = company_id.map(|id| ("company_id", id.to_string())).into_iter().collect();
            api_request(base_url, reqwest::Method::GET, "/api/strategies", &query, None).await?
        }
        StrategySubcommand::Get { strategy_id } => {
            api_request(base_url, reqwest::Method::GET, &format!("/api/strategies/{strategy_id}"), &[], None).await?
        }
        StrategySubcommand::Budget { strategy_id, budget, agency_fee_percent, tax_percent } => {
            let body = serde_json::json!({
                "budget": budget,
                "agency_fee_percent": agency_fee_percent,
                "tax_percent": tax_percent,
            });
            let path = format!("/api/strategies/{strategy_id}/budget");
            api_request(base_url, reqwest::Method::PATCH, &path, &[], Some(body)).await?
        }
        StrategySubcommand::AddDeliverable { strategy_id, data } => {
            let body = serde_json::from_str::<Value>(&data)?;
            let path = format!("/api/strategies/{strategy_id}/deliverables");
            api_request(base_url, reqwest::Method::POST, &path, &[], Some(body)).await?
        }
        StrategySubcommand::SetQuantity { strategy_id, item_id, quantity } => {
            let path = format!("/api/strategies/{strategy_id}/deliverables/{item_id}");
            let body = serde_json::json!({ "quantity": quantity });
            api_request(base_url, reqwest::Method::PATCH, &path, &[], Some(body)).await?
        }
        StrategySubcommand::RemoveDeliverable { strategy_id, item_id } => {
            let path = format!("/api/strategies/{strategy_id}/deliverables/{item_id}");
            api_request(base_url, reqwest::Method::DELETE, &path, &[], None).await?
        }
        StrategySubcommand::FlyerSlots { strategy_id, file } => {
            let body = read_json(&file)?;
            let path = format!("/api/strategies/{strategy_id}/flyer-slots");
            api_request(base_url, reqwest::Method::PUT, &path, &[], Some(body)).await?
        }
        StrategySubcommand::Watch => return watch_strategies(base_url).await,
    };
    print_json(&json)
}

// =============================================================================
// WEBSOCKET COMMANDS
// =============================================================================

async fn run_preview(base_url: &str, preview: PreviewCommand) -> Result<(), CliError> {
    match preview.command {
        PreviewSubcommand::Push { creator_id, theme, creator, actions, save, follow } => {
            let profile: landing::CreatorProfile = serde_json::from_value(read_json(&creator)?)?;
            let mut editor = build_editor(&read_json(&theme)?, profile, &actions)?;
            let mut stream = connect(base_url).await?;

            let join = serde_json::json!({ "creator_id": creator_id.to_string(), "role": "editor" });
            call(&mut stream, "preview:join", Some(creator_id), join).await?;

            let envelope = editor.snapshot();
            let receipt = call(&mut stream, "preview:update", Some(creator_id), envelope.to_json()?).await?;
            print_json(&receipt.data)?;

            if save && editor.is_dirty() {
                let body = serde_json::to_value(editor.begin_save()?)?;
                let path = format!("/api/creators/{creator_id}/theme");
                let saved = api_request(base_url, reqwest::Method::PUT, &path, &[], Some(body)).await;
                editor.finish_save(saved.is_ok());
                saved?;
                eprintln!("saved theme for {creator_id}");
            }

            if !follow {
                return Ok(());
            }
            loop {
                let frame = recv_next(&mut stream, Duration::from_secs(3600)).await?;
                if frame.syscall != "preview:ready" || frame.status != Status::Item {
                    continue;
                }
                let replay = editor.resend();
                let receipt = call(&mut stream, "preview:update", Some(creator_id), replay.to_json()?).await?;
                eprintln!("surface {} ready; replayed local seq {}", frame.from.as_deref().unwrap_or("?"), replay.seq);
                print_json(&receipt.data)?;
            }
        }
        PreviewSubcommand::Watch { creator_id, count, html } => {
            let mut stream = connect(base_url).await?;
            let mut surface = landing::PreviewSurface::new();

            let join = serde_json::json!({ "creator_id": creator_id.to_string(), "role": "surface" });
            let joined = call(&mut stream, "preview:join", Some(creator_id), join).await?;
            eprintln!("joined preview room {creator_id} at seq {}", joined.data.get("seq").unwrap_or(&Value::Null));
            if let Some(snapshot) = joined.data.get("snapshot") {
                apply_snapshot(&mut surface, snapshot.clone())?;
                println!("{}", surface_summary(&surface));
            }
            call(&mut stream, "preview:ready", Some(creator_id), surface.announce_ready().to_json()?).await?;

            let mut seen = 0_usize;
            loop {
                let frame = recv_next(&mut stream, Duration::from_secs(3600)).await?;
                if frame.syscall != "preview:update" {
                    continue;
                }
                if !apply_snapshot(&mut surface, frame.data)? {
                    continue;
                }
                println!("{}", surface_summary(&surface));
                if let (Some(path), Some(page)) = (&html, surface.render()) {
                    std::fs::write(path, page).map_err(|source| CliError::Io {
                        action: "write",
                        path: path.clone(),
                        source,
                    })?;
                }
                seen = seen.saturating_add(1);
                if count.is_some_and(|limit| seen >= limit) {
                    return Ok(());
                }
            }
        }
    }
}

/// Editor session seeded from a stored theme blob, with `actions` applied in order.
fn build_editor(
    stored: &Value,
    profile: landing::CreatorProfile,
    actions: &[String],
) -> Result<landing::ThemeEditor, CliError> {
    let mut editor = landing::ThemeEditor::new(landing::resolve_theme(stored), profile);
    for raw in actions {
        let action: landing::ThemeAction = serde_json::from_str(raw)?;
        editor.dispatch(action)?;
    }
    Ok(editor)
}

/// Apply one pushed payload to the surface. False when it carried no update.
fn apply_snapshot(surface: &mut landing::PreviewSurface, data: Value) -> Result<bool, CliError> {
    Ok(surface.apply(landing::PreviewEnvelope::from_json(data)?))
}

fn surface_summary(surface: &landing::PreviewSurface) -> String {
    let seq = surface.last_seq().map_or_else(|| "-".to_owned(), |seq| seq.to_string());
    let layout = surface.theme().map_or("-", |theme| theme.layout.as_str());
    let sections: Vec<&str> = surface.sections().iter().map(|section| section.key.as_str()).collect();
    format!("seq={seq} layout={layout} sections={}", sections.join(","))
}

async fn watch_strategies(base_url: &str) -> Result<(), CliError> {
    let mut stream = connect(base_url).await?;
    call(&mut stream, "strategy:subscribe", None, Value::Object(Map::new())).await?;
    eprintln!("watching strategy changes");
    loop {
        let frame = recv_next(&mut stream, Duration::from_secs(3600)).await?;
        if frame.syscall == "strategy:changed" {
            println!("{}", frame.data.get("id").and_then(Value::as_str).unwrap_or("?"));
        }
    }
}

async fn connect(base_url: &str) -> Result<WsStream, CliError> {
    let (mut stream, _) =
        connect_async(ws_url(base_url)?).await.map_err(|error| CliError::WsConnect(Box::new(error)))?;
    wait_for_session_connected(&mut stream).await?;
    Ok(stream)
}

/// Send one request and wait for its terminal reply.
async fn call(stream: &mut WsStream, syscall: &str, creator_id: Option<Uuid>, data: Value) -> Result<Frame, CliError> {
    let req = request_frame(syscall, creator_id, data);
    let req_id = req.id.clone();
    stream
        .send(Message::Binary(frames::encode_frame(&req).into()))
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;
    wait_for_terminal_response(stream, &req_id, syscall).await
}

// =============================================================================
// HELPERS
// =============================================================================

async fn api_request(
    base_url: &str,
    method: reqwest::Method,
    path: &str,
    query: &[(&str, String)],
    body: Option<Value>,
) -> Result<Value, CliError> {
    let client = reqwest::Client::new();
    let request = client.request(method, format!("{base_url}{path}")).query(query);
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = value.get("message").and_then(Value::as_str).map_or_else(|| value.to_string(), ToOwned::to_owned);
        return Err(CliError::ServerError { syscall: format!("HTTP {}", status.as_u16()), message });
    }

    Ok(value)
}

fn ws_url(base_url: &str) -> Result<String, CliError> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

async fn wait_for_session_connected(stream: &mut WsStream) -> Result<(), CliError> {
    loop {
        let frame = recv_next(stream, Duration::from_secs(5)).await?;
        if frame.syscall == "session:connected" {
            return Ok(());
        }
    }
}

async fn wait_for_terminal_response(stream: &mut WsStream, request_id: &str, syscall: &str) -> Result<Frame, CliError> {
    loop {
        let frame = recv_next(stream, Duration::from_secs(15)).await?;
        if frame.parent_id.as_deref() != Some(request_id) || frame.syscall != syscall {
            continue;
        }
        if !matches!(frame.status, Status::Done | Status::Error | Status::Cancel) {
            continue;
        }
        if frame.status == Status::Error {
            return Err(CliError::ServerError {
                syscall: frame.syscall,
                message: frame
                    .data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown websocket error")
                    .to_owned(),
            });
        }
        return Ok(frame);
    }
}

async fn recv_next(stream: &mut WsStream, timeout: Duration) -> Result<Frame, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
                Message::Binary(bytes) => return frames::decode_frame(&bytes).map_err(CliError::from),
                Message::Text(text) => return frames::decode_text_frame(text.as_str()).map_err(CliError::from),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut).await.map_err(|_| CliError::Timeout)?
}

fn request_frame(syscall: &str, creator_id: Option<Uuid>, data: Value) -> Frame {
    Frame {
        version: frames::FRAME_PROTOCOL_VERSION,
        id: Uuid::new_v4().to_string(),
        parent_id: None,
        ts: now_ms(),
        creator_id: creator_id.map(|value| value.to_string()),
        from: None,
        syscall: syscall.to_owned(),
        status: Status::Request,
        data,
    }
}

fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn read_json(path: &str) -> Result<Value, CliError> {
    let mut raw = String::new();
    if path == "-" {
        io::stdin()
            .read_to_string(&mut raw)
            .map_err(|source| CliError::Io { action: "read", path: path.to_owned(), source })?;
    } else {
        raw = std::fs::read_to_string(path)
            .map_err(|source| CliError::Io { action: "read", path: path.to_owned(), source })?;
    }
    Ok(serde_json::from_str(&raw)?)
}

/// One creator per line. Blank lines and non-objects are skipped; server
/// owned fields are dropped so exports from one instance import into another.
fn parse_jsonl_creator_line(line: &str) -> Result<Option<Value>, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut value = serde_json::from_str::<Value>(trimmed)?;
    let Some(map) = value.as_object_mut() else {
        return Ok(None);
    };

    for key in ["id", "created_at", "updated_at", "approval_status", "admin_notes", "landing_theme"] {
        map.remove(key);
    }

    if !map.get("name").and_then(Value::as_str).is_some_and(|name| !name.trim().is_empty()) {
        return Ok(None);
    }
    Ok(Some(value))
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
