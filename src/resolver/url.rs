//! Request URL decoding.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Decode a request URL the way form decoding does: `+` becomes a space and
/// `%XX` escapes are resolved.
///
/// Never fails: malformed escapes or invalid UTF-8 yield the raw input.
pub fn decode_url(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['%', '+']) {
        return Cow::Borrowed(raw);
    }

    try_decode(raw).map(Cow::Owned).unwrap_or(Cow::Borrowed(raw))
}

fn try_decode(raw: &str) -> Option<String> {
    if has_malformed_escape(raw) {
        return None;
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

/// A `%` not followed by two hex digits.
fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url_borrowed() {
        assert!(matches!(decode_url("/api/users"), Cow::Borrowed("/api/users")));
    }

    #[test]
    fn test_percent_and_plus_decoded() {
        assert_eq!(decode_url("/files/my%20report+final.pdf"), "/files/my report final.pdf");
        assert_eq!(decode_url("/caf%C3%A9"), "/café");
    }

    #[test]
    fn test_malformed_escape_returns_raw() {
        assert_eq!(decode_url("/100%zz+off"), "/100%zz+off");
        assert_eq!(decode_url("/trailing%2"), "/trailing%2");
    }

    #[test]
    fn test_invalid_utf8_returns_raw() {
        assert_eq!(decode_url("/bad%FF"), "/bad%FF");
    }
}
