/// Decodes a percent-encoded string (`%XX`) and converts `+` to space.
///
/// Decoding happens on bytes so that multi-byte UTF-8 sequences survive;
/// invalid sequences are replaced.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push(((h << 4) | l) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parses `key=value&key2=value2` into a `Vec` of `(key, value)` pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut it = pair.splitn(2, '=');
            let k = it.next()?;
            let v = it.next().unwrap_or("");
            Some((url_decode(k), url_decode(v)))
        })
        .collect()
}

/// Looks up a key in parsed form pairs, returning the value if found.
pub fn form_get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escapes_and_plus() {
        assert_eq!(url_decode("a+b%2Bc%3D%3D"), "a b+c==");
        assert_eq!(url_decode("data%3Aimage%2Fpng%3Bbase64%2CQUJD"), "data:image/png;base64,QUJD");
    }

    #[test]
    fn malformed_escapes_are_kept() {
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
        assert_eq!(url_decode("%4"), "%4");
    }

    #[test]
    fn decodes_multibyte_utf8() {
        assert_eq!(url_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn parses_pairs_and_looks_up() {
        let pairs = parse_form("style=candy&content=QUJD%3D&empty=&flag");
        assert_eq!(form_get(&pairs, "style"), Some("candy"));
        assert_eq!(form_get(&pairs, "content"), Some("QUJD="));
        assert_eq!(form_get(&pairs, "empty"), Some(""));
        assert_eq!(form_get(&pairs, "flag"), Some(""));
        assert_eq!(form_get(&pairs, "missing"), None);
    }
}
