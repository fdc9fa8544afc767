use std::io::{Cursor, Read};
use tiny_http::{Request, Response};

use ferrite_style::codec::{encode_base64, to_data_uri, JPEG_MIME};
use ferrite_style::Error;

use crate::routes::text_response;
use crate::state::SharedState;
use crate::util::form::{form_get, parse_form};
use crate::util::multipart::{extract_boundary, extract_file_field, extract_text_field};

/// Image content as submitted: base64 text (optionally a data URI) from a
/// form field, or raw bytes from a file upload.
#[derive(Debug, PartialEq)]
enum Content {
    Encoded(String),
    Raw(Vec<u8>),
}

#[derive(Debug)]
struct StylizeForm {
    style:   Option<String>,
    content: Option<Content>,
}

// ---------------------------------------------------------------------------
// POST /stylize
// ---------------------------------------------------------------------------

pub fn handle_post(request: &mut Request, query: &str, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let form = match read_form(request, query, state.max_body_bytes) {
        Ok(form)  => form,
        Err(resp) => return resp,
    };

    let style = match form.style {
        Some(s) if !s.is_empty() => s,
        _ => return client_error(400, "missing form field 'style'"),
    };
    let content = match form.content {
        Some(c) => c,
        None    => return client_error(400, "missing form field 'content'"),
    };

    tracing::info!("Got file and style {}", style);
    let stylizer = &state.stylizer;
    let result = match content {
        Content::Encoded(text) => stylizer.stylize_image(&text, &style),
        Content::Raw(bytes)    => stylizer.stylize_bytes(&bytes, &style).map(|jpeg| encode_base64(&jpeg)),
    };

    match result {
        Ok(payload) => {
            tracing::info!("Result send back");
            text_response(200, to_data_uri(JPEG_MIME, &payload))
        }
        Err(e) => error_response(&e),
    }
}

// ---------------------------------------------------------------------------
// Form reading
// ---------------------------------------------------------------------------

/// Reads the body (bounded by `max_body`) and merges it with the query.
fn read_form(request: &mut Request, query: &str, max_body: usize) -> Result<StylizeForm, Response<Cursor<Vec<u8>>>> {
    if request.body_length().is_some_and(|len| len > max_body) {
        return Err(too_large(max_body));
    }

    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let mut body: Vec<u8> = Vec::new();
    if let Err(e) = request.as_reader().take(max_body as u64 + 1).read_to_end(&mut body) {
        return Err(client_error(400, &format!("failed to read request body: {}", e)));
    }
    if body.len() > max_body {
        return Err(too_large(max_body));
    }

    merge_form(&content_type, &body, query).map_err(|msg| client_error(400, msg))
}

/// Collects `style` and `content` from the query string, then from the body
/// (url-encoded or multipart).  Query values win, as they do in most web
/// frameworks' combined views.  In a multipart body a text `content` part
/// wins over a file `content` part.
fn merge_form(content_type: &str, body: &[u8], query: &str) -> Result<StylizeForm, &'static str> {
    let query_pairs = parse_form(query);
    let mut form = StylizeForm {
        style:   form_get(&query_pairs, "style").map(str::to_owned),
        content: form_get(&query_pairs, "content").map(|c| Content::Encoded(c.to_owned())),
    };

    if content_type.starts_with("multipart/form-data") {
        let boundary = extract_boundary(content_type).ok_or("multipart request without boundary")?;
        if form.style.is_none() {
            form.style = extract_text_field(body, &boundary, "style");
        }
        if form.content.is_none() {
            form.content = extract_text_field(body, &boundary, "content")
                .map(Content::Encoded)
                .or_else(|| extract_file_field(body, &boundary, "content").map(Content::Raw));
        }
    } else {
        let text = String::from_utf8_lossy(body);
        let pairs = parse_form(&text);
        if form.style.is_none() {
            form.style = form_get(&pairs, "style").map(str::to_owned);
        }
        if form.content.is_none() {
            form.content = form_get(&pairs, "content").map(|c| Content::Encoded(c.to_owned()));
        }
    }

    Ok(form)
}

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

/// HTTP status for a pipeline failure.
pub fn status_for(err: &Error) -> u16 {
    match err {
        Error::UnknownStyle { .. }       => 404,
        e if e.is_client_error()         => 400,
        _                                => 500,
    }
}

fn error_response(err: &Error) -> Response<Cursor<Vec<u8>>> {
    let status = status_for(err);
    if status >= 500 {
        tracing::error!("Stylization failed: {}", err);
    } else {
        tracing::warn!("Rejected request: {}", err);
    }
    text_response(status, err.to_string())
}

fn client_error(status: u16, msg: &str) -> Response<Cursor<Vec<u8>>> {
    tracing::warn!("Rejected request: {}", msg);
    text_response(status, msg.to_owned())
}

fn too_large(max_body: usize) -> Response<Cursor<Vec<u8>>> {
    client_error(413, &format!("request body exceeds {} bytes", max_body))
}
