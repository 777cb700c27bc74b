//! Development server with live reload via Server-Sent Events.
//!
//! Serves the client output directory from disk and pushes build events to
//! connected browsers. Every response carries `Access-Control-Allow-Origin: *`
//! so that a failed compile shows up as a build error in the browser instead
//! of a CORS failure on the server-rendered page.

use crate::dev::{DevEvent, SharedState, error_overlay};
use crate::error::{CliError, Result};
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response, Sse},
    routing::get,
};
use rust_embed::RustEmbed;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use tokio::task::JoinHandle;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// SSE endpoint for reload events.
pub const SSE_PATH: &str = "/__tandem_sse__";

/// Reload client script injected into served HTML.
pub const RELOAD_SCRIPT_PATH: &str = "/__tandem_reload__.js";

#[derive(RustEmbed)]
#[folder = "assets/dev"]
struct DevAssets;

/// Dev server settings.
#[derive(Debug, Clone)]
pub struct DevServerOptions {
    /// Address to bind
    pub addr: SocketAddr,
    /// Serve index.html for unknown extension-less paths
    pub history_fallback: bool,
}

/// Development server.
pub struct DevServer {
    options: DevServerOptions,
    state: SharedState,
}

/// Running dev server. The server stops when the handle is dropped.
#[derive(Debug)]
pub struct DevServerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl DevServerHandle {
    /// Address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for DevServerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl DevServer {
    pub fn new(options: DevServerOptions, state: SharedState) -> Self {
        Self { options, state }
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// # Errors
    ///
    /// Returns error if the server cannot bind to the configured address.
    pub async fn bind(self) -> Result<DevServerHandle> {
        let listener = tokio::net::TcpListener::bind(self.options.addr)
            .await
            .map_err(|e| {
                CliError::Server(format!("Failed to bind to {}: {}", self.options.addr, e))
            })?;
        let addr = listener.local_addr()?;

        let app = build_router(self.state, self.options.history_fallback);
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("dev server stopped: {}", e);
            }
        });

        tracing::debug!("dev server listening on {}", addr);
        Ok(DevServerHandle { addr, task })
    }
}

#[derive(Clone)]
struct AppState {
    shared: SharedState,
    history_fallback: bool,
}

/// Build the axum router with all routes.
pub fn build_router(state: SharedState, history_fallback: bool) -> Router {
    Router::new()
        .route(SSE_PATH, get(handle_sse))
        .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
        .route("/favicon.ico", get(handle_favicon))
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(AppState {
            shared: state,
            history_fallback,
        })
}

/// Handle SSE connections for reload events.
async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<
    impl tokio_stream::Stream<Item = std::result::Result<axum::response::sse::Event, axum::Error>>,
> {
    use axum::response::sse::Event;

    let (id, rx) = state.shared.subscribe();
    tracing::debug!("browser {} connected for live reload", id);
    state.shared.notify_browsers(&DevEvent::ClientConnected { id });

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script() -> Response {
    match DevAssets::get("reload-client.js") {
        Some(asset) => (
            [
                (header::CONTENT_TYPE, "application/javascript"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            asset.data.into_owned(),
        )
            .into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "Missing embedded reload client").into_response(),
    }
}

async fn handle_favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Serve the client output, the error overlay, or the history fallback.
async fn handle_request(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();

    let Some(relative) = sanitize_path(path) else {
        return (StatusCode::BAD_REQUEST, "Invalid path").into_response();
    };

    if is_navigation(path) {
        if let Some(errors) = state.shared.status().errors() {
            return html_response(error_overlay::generate_error_overlay(errors).into_bytes());
        }
    }

    let public_dir = state.shared.public_dir();
    let mut file_path = public_dir.join(&relative);
    if file_path.is_dir() {
        file_path = file_path.join("index.html");
    }

    if file_path.is_file() {
        return serve_file(&file_path).await;
    }

    if state.history_fallback && is_navigation(path) {
        let index = public_dir.join("index.html");
        if index.is_file() {
            return serve_file(&index).await;
        }
    }

    (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response()
}

async fn serve_file(file_path: &Path) -> Response {
    match tokio::fs::read(file_path).await {
        Ok(content) => {
            let content_type = determine_content_type(file_path);
            if content_type.starts_with("text/html") {
                html_response(inject_reload_script(&content))
            } else {
                (
                    [
                        (header::CONTENT_TYPE, content_type),
                        (header::CACHE_CONTROL, "no-cache"),
                    ],
                    Body::from(content),
                )
                    .into_response()
            }
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {}", file_path.display(), e);
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}

fn html_response(html: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from(html),
    )
        .into_response()
}

/// Map a request path onto a relative file path, rejecting traversal.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(relative)
}

/// Page requests: no file extension, or an explicit .html file.
fn is_navigation(path: &str) -> bool {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case("html"),
    }
}

/// Inject reload script into HTML content.
///
/// Adds the reload client script before the closing </body> tag.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let script_tag = format!(r#"<script src="{}"></script>"#, RELOAD_SCRIPT_PATH);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 10);
        result.push_str(&html[..pos]);
        result.push_str("\n  ");
        result.push_str(&script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.into_owned();
    result.push('\n');
    result.push_str(&script_tag);
    result.into_bytes()
}

/// Determine content type from file extension.
fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "wasm" => "application/wasm",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}
