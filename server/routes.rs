use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(field: &str, value: &str) -> Header {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).unwrap()
}

fn bytes_response(status: u16, content_type: &str, body: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = body.len();
    Response::new(
        StatusCode(status),
        vec![header("Content-Type", content_type)],
        Cursor::new(body),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn text_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(status, "text/plain; charset=utf-8", body.into_bytes())
}

pub fn json_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "application/json", body.into_bytes())
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    text_response(404, "404 Not Found".to_owned())
}

/// Splits a request URL into path and query string.
pub fn split_url(url: &str) -> (&str, &str) {
    match url.find('?') {
        Some(pos) => (&url[..pos], &url[pos + 1..]),
        None      => (url, ""),
    }
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers receive a `&mut Request` so that the dispatcher retains
/// ownership and can call `request.respond(response)` at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let (path, query) = split_url(&url);

    let response = match (method, path) {
        (Method::Get,  "/")        => handlers::index::handle_get(&state),
        (Method::Post, "/stylize") => handlers::stylize::handle_post(&mut request, query, &state),
        (Method::Get,  "/styles")  => handlers::styles::handle_get(&state),
        _                          => not_found(),
    };

    if let Err(e) = request.respond(response) {
        tracing::warn!("Failed to send response: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_url_separates_query() {
        assert_eq!(split_url("/stylize?style=candy"), ("/stylize", "style=candy"));
        assert_eq!(split_url("/"), ("/", ""));
    }
}
