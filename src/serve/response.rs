//! HTTP response helpers.

use crate::utils::mime;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tiny_http::{Header, Request, Response, StatusCode};

/// Respond with a static file and inferred content type.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);
    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    send(request, 200, content_type, body)
}

/// Respond with a rendered HTML page (directory listing).
pub fn respond_html(request: Request, body: String) -> Result<()> {
    send(request, 200, mime::types::HTML, body.into_bytes())
}

/// Respond with 404 and a plain-text message.
pub fn respond_not_found(request: Request, message: &str) -> Result<()> {
    send(request, 404, mime::types::PLAIN, message.as_bytes().to_vec())
}

fn send(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}
