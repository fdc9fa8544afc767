use std::io::Cursor;
use tiny_http::Response;

use crate::render::{render_index, style_options};
use crate::state::SharedState;

/// `GET /`
pub fn handle_get(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let stylizer = &state.stylizer;
    let styles = stylizer.library().list().unwrap_or_else(|e| {
        tracing::warn!("Could not list styles: {}", e);
        Vec::new()
    });
    let page = render_index(&style_options(&styles), stylizer.config().image_size);
    crate::routes::html_response(page)
}
