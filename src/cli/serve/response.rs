//! HTTP response helpers.

use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

/// Sent with every response: module files must never come from a cache.
pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

const PLAIN: &str = "text/plain; charset=utf-8";

/// Content type by extension for the files a module directory holds.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "py" => "text/x-python; charset=utf-8",
        "wgsl" => "text/wgsl; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" => "application/json",
        "wasm" => "application/wasm",
        "whl" | "zip" => "application/zip",
        "txt" | "md" | "toml" => PLAIN,
        "png" => "image/png",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Respond with a file from disk.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let body = fs::read(path)?;
    send_body(request, 200, content_type(path), body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    let body = format!("404 Not Found: {}", request.url());
    send_body(request, 404, PLAIN, body.into_bytes())
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    send_body(request, 405, PLAIN, b"405 Method Not Allowed".to_vec())
}

/// Respond with 503 while shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", NO_CACHE)?)
        .with_header(make_header("Pragma", "no-cache")?)
        .with_header(make_header("Access-Control-Allow-Origin", "*")?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
