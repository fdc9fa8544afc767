/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
}

/// One part of a multipart body: its header block and its payload.
struct Part<'a> {
    headers: String,
    data:    &'a [u8],
}

impl Part<'_> {
    /// Value of a `Content-Disposition` parameter, quotes removed.
    fn disposition_param(&self, key: &str) -> Option<&str> {
        let line = self.headers.lines().find(|l| {
            l.split_once(':')
                .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("content-disposition"))
        })?;
        let (_, value) = line.split_once(':')?;
        value
            .split(';')
            .skip(1)
            .filter_map(|param| param.trim().split_once('='))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim().trim_matches('"'))
    }

    fn has_name(&self, field_name: &str) -> bool {
        self.disposition_param("name") == Some(field_name)
    }

    fn is_file(&self) -> bool {
        self.disposition_param("filename").is_some()
    }
}

fn parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";

    split_on(body, delimiter.as_bytes())
        .into_iter()
        .filter_map(|part| {
            let sep_pos = find_subsequence(part, sep)?;
            let headers = String::from_utf8_lossy(&part[..sep_pos]).into_owned();
            let raw = &part[sep_pos + sep.len()..];
            let data = raw.strip_suffix(b"\r\n").unwrap_or(raw);
            Some(Part { headers, data })
        })
        .collect()
}

/// Extracts a plain-text (non-file) field from a multipart body.
pub fn extract_text_field(body: &[u8], boundary: &str, field_name: &str) -> Option<String> {
    parts(body, boundary)
        .into_iter()
        .find(|p| p.has_name(field_name) && !p.is_file())
        .and_then(|p| String::from_utf8(p.data.to_vec()).ok())
}

/// Extracts the raw bytes of a named file part from a multipart/form-data body.
pub fn extract_file_field(body: &[u8], boundary: &str, field_name: &str) -> Option<Vec<u8>> {
    parts(body, boundary)
        .into_iter()
        .find(|p| p.has_name(field_name) && p.is_file())
        .map(|p| p.data.to_vec())
}
