use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path as UrlPath, State, WebSocketUpgrade};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use lectern_context::project::Project;
use std::path::{Component, Path, PathBuf};
use tokio::sync::broadcast;

/// Fixed dev server port.
const PORT: u16 = 3002;

const LIVERELOAD_JS: &str = include_str!("livereload.js");
const LIVERELOAD_TAG: &str = r#"<script src="/__lectern/livereload.js"></script>"#;

#[derive(Clone)]
struct AppState {
    project: Project,
    reload_tx: broadcast::Sender<()>,
}

/// Serve the project directory on the fixed port, with the built entry page
/// at `/` and a WebSocket reload channel at `/__lectern/ws`. HTML responses
/// get the live reload client injected.
pub(crate) async fn run(project: Project, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let state = AppState { project, reload_tx };

    let app = Router::new()
        .route("/__lectern/ws", get(ws_handler))
        .route("/__lectern/livereload.js", get(client_handler))
        .route("/", get(index_handler))
        .route("/{*path}", get(static_handler))
        .with_state(state);

    let addr = format!("0.0.0.0:{PORT}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    println!("[dev] Server running at http://localhost:{PORT}");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler(State(state): State<AppState>) -> Response {
    let entry = state.project.entry_file();
    match std::fs::read_to_string(&entry) {
        Ok(html) => Html(inject_livereload(&html)).into_response(),
        Err(_) => {
            let rel = entry
                .strip_prefix(&state.project.root)
                .unwrap_or(&entry)
                .display()
                .to_string();
            (StatusCode::NOT_FOUND, Html(missing_entry_html(&rel))).into_response()
        }
    }
}

async fn static_handler(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> Response {
    let Some(rel) = sanitize(&path) else {
        return (StatusCode::NOT_FOUND, Html(not_found_html(&path))).into_response();
    };
    let file_path = state.project.root.join(rel);
    let content_type = content_type_for(&file_path);

    if content_type == "text/html" {
        match std::fs::read_to_string(&file_path) {
            Ok(html) => Html(inject_livereload(&html)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, Html(not_found_html(&path))).into_response(),
        }
    } else {
        match std::fs::read(&file_path) {
            Ok(bytes) => {
                (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response()
            }
            Err(_) => (StatusCode::NOT_FOUND, Html(not_found_html(&path))).into_response(),
        }
    }
}

async fn client_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        LIVERELOAD_JS,
    )
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state.reload_tx))
}

async fn handle_ws(socket: WebSocket, reload_tx: broadcast::Sender<()>) {
    let mut rx = reload_tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    // Forward reload signals to the browser.
    let send_task = tokio::spawn(async move {
        while rx.recv().await.is_ok() {
            let msg = Message::Text("{\"type\":\"reload\"}".into());
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Drain incoming messages to keep the connection alive.
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }
}

/// Insert the live reload client tag before the closing body tag, or append
/// it when the page has none.
fn inject_livereload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + LIVERELOAD_TAG.len() + 1);
            out.push_str(&html[..pos]);
            out.push_str(LIVERELOAD_TAG);
            out.push('\n');
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}\n{LIVERELOAD_TAG}"),
    }
}

/// Resolve a request path to a relative filesystem path, rejecting anything
/// that would escape the project root.
fn sanitize(path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            _ => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        _ => "application/octet-stream",
    }
}

fn missing_entry_html(entry: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
        <h1>No build output yet</h1>
        <p>Could not find <code>{entry}</code>.</p>
        <p>Run <code>lectern build</code>, or save a watched file to trigger one.</p>
        {LIVERELOAD_TAG}
        </body></html>"#
    )
}

fn not_found_html(path: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
        <h1>404 — Not found</h1>
        <p>No file at <code>{path}</code></p>
        </body></html>"#
    )
}
