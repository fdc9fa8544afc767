use std::io::Cursor;
use serde::Serialize;
use tiny_http::Response;

use ferrite_style::StylizeConfig;

use crate::state::SharedState;

#[derive(Serialize)]
struct StylesBody<'a> {
    styles: Vec<String>,
    config: &'a StylizeConfig,
}

/// `GET /styles`
///
/// Lists the styles that currently have a weight file, plus the settings the
/// server stylizes with.
pub fn handle_get(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let stylizer = &state.stylizer;
    let styles = match stylizer.library().list() {
        Ok(s)  => s,
        Err(e) => return crate::routes::text_response(500, format!("could not list styles: {}", e)),
    };
    let body = StylesBody { styles, config: stylizer.config() };
    match serde_json::to_string(&body) {
        Ok(json) => crate::routes::json_response(json),
        Err(e)   => crate::routes::text_response(500, e.to_string()),
    }
}
