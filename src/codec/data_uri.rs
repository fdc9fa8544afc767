use base64::{prelude::BASE64_STANDARD, Engine};

use crate::error::Result;

/// MIME type of every image the service returns.
pub const JPEG_MIME: &str = "image/jpeg";

/// Returns the payload of a data URI, i.e. everything after the first comma.
///
/// A string without a comma is assumed to be bare base64 and returned as is.
pub fn strip_data_uri(content: &str) -> &str {
    match content.find(',') {
        Some(pos) => &content[pos + 1..],
        None => content,
    }
}

/// Decodes standard base64, ignoring ASCII whitespace.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(BASE64_STANDARD.decode(compact.as_bytes())?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Builds `data:{mime};base64,{payload}`.
pub fn to_data_uri(mime: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime, payload)
}
