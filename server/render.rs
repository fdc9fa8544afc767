/// Template renderer for the single page the server exposes.
///
/// The page lives in `server/assets/index.html` and is compiled into the
/// binary.  Placeholders look like `{{TOKEN}}`; any left unfilled are blanked
/// so raw tokens never reach the browser.

const TEMPLATE: &str = include_str!("assets/index.html");

/// Renders the index page with the given `<option>` list for the style picker.
pub fn render_index(style_options: &str, image_size: u32) -> String {
    let html = TEMPLATE
        .replace("{{STYLE_OPTIONS}}", style_options)
        .replace("{{IMAGE_SIZE}}", &image_size.to_string());
    blank_remaining(html)
}

/// Builds `<option>` elements for each style name, or a disabled placeholder
/// when the library is empty.
pub fn style_options(styles: &[String]) -> String {
    if styles.is_empty() {
        return r#"<option disabled selected>No styles found</option>"#.into();
    }
    styles.iter()
        .map(|name| format!("<option value=\"{0}\">{0}</option>", html_escape(name)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_escaped() {
        let opts = style_options(&["candy".into(), "a<b".into()]);
        assert!(opts.contains("<option value=\"candy\">candy</option>"));
        assert!(opts.contains("a&lt;b"));
    }

    #[test]
    fn empty_library_renders_placeholder() {
        assert!(style_options(&[]).contains("disabled"));
    }

    #[test]
    fn page_has_no_raw_tokens() {
        let page = render_index("<option>x</option>", 512);
        assert!(!page.contains("{{"));
        assert!(page.contains("<option>x</option>"));
    }

    #[test]
    fn blanks_unknown_tokens() {
        assert_eq!(blank_remaining("a{{X}}b{{Y}}c".into()), "abc");
    }
}
