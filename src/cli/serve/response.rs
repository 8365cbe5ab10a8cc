//! HTTP response handlers.

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::ServeContext;
use crate::embed::serve::{LIVERELOAD_JS, LiveReloadVars};
use crate::render::render_page;
use crate::utils::mime::{HTML, JAVASCRIPT, PLAIN};

/// Respond with the freshly rendered document, or 500 if it cannot be read.
pub fn respond_page(request: Request, ctx: &ServeContext) -> Result<()> {
    let snapshot = match ctx.store.read() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            crate::log!("serve"; "GET {}: {}", request.url(), e);
            return respond_read_error(request, &e);
        }
    };

    if is_head_request(&request) {
        return send_head(request, 200, HTML);
    }

    let body = render_page(&snapshot.content, &ctx.store.title(), ctx.port);
    send_body(request, 200, HTML, body.into_bytes())
}

/// Plain-text 500 for a failed read.
fn respond_read_error(request: Request, error: &crate::error::PreviewError) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 500, PLAIN);
    }
    let body = format!("Error reading markdown file: {error}");
    send_body(request, 500, PLAIN, body.into_bytes())
}

/// Respond with livereload.js from memory.
pub fn respond_livereload_js(request: Request, ws_port: u16) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, JAVASCRIPT);
    }
    let body = LIVERELOAD_JS.render(&LiveReloadVars { ws_port });
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-store")?);
    request.respond(response).context("failed to send response")
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-store")?);
    request.respond(response).context("failed to send response")
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_header() {
        let header = make_header("Content-Type", HTML).unwrap();
        assert!(header.field.equiv("content-type"));
        assert_eq!(header.value.as_str(), HTML);
    }

    #[test]
    fn test_make_header_rejects_non_ascii() {
        assert!(make_header("X-Title", "café").is_err());
    }
}
