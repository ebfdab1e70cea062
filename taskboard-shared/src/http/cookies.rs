/// HTTP cookie parsing and serialization
///
/// Handles decoding the `Cookie` header and generating `Set-Cookie` values.
/// Values are percent-encoded so JSON payloads (the flash cookie) survive
/// the cookie grammar.
///
/// # Example
///
/// ```
/// use taskboard_shared::http::cookies::{Cookie, Cookies};
///
/// let cookies = Cookies::parse("session=abc123; flash=%7B%7D");
/// assert_eq!(cookies.get("session"), Some("abc123"));
///
/// let header = Cookie::new("session", "abc123").path("/").http_only().encode();
/// assert!(header.starts_with("session=abc123"));
/// ```

use std::collections::HashMap;

/// Percent-encodes a cookie value
///
/// Everything outside the unreserved set is escaped, which keeps separators
/// (`;`, `=`, `,`, spaces) out of the serialized header.
pub fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Decodes a percent-encoded cookie value
///
/// Malformed escapes are passed through verbatim rather than rejected; a
/// broken cookie should read as garbage, not break the request.
pub fn urldecode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(&hi), Some(&lo)) = (bytes.get(i + 1), bytes.get(i + 2)) {
                if let (Some(hi), Some(lo)) =
                    ((hi as char).to_digit(16), (lo as char).to_digit(16))
                {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Cookies sent by the client, keyed by name
///
/// Values are decoded on parse.
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    cookies: HashMap<String, String>,
}

impl Cookies {
    /// Parses the value of a `Cookie` request header
    ///
    /// Pairs without an `=` are ignored, matching browser behavior.
    pub fn parse(header: &str) -> Self {
        let mut cookies = HashMap::new();

        for part in header.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some(idx) = part.find('=') {
                let name = part[..idx].trim();
                let value = part[idx + 1..].trim();
                cookies.insert(name.to_string(), urldecode(value));
            }
        }

        Self { cookies }
    }

    /// Parses cookies out of a full header map
    ///
    /// Returns an empty set when the `Cookie` header is absent or not UTF-8.
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Gets a cookie value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|s| s.as_str())
    }
}

/// A cookie to be sent to the client via `Set-Cookie`
#[derive(Debug, Clone)]
pub struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
    max_age: Option<i64>,
    http_only: bool,
    expired: bool,
}

impl Cookie {
    /// Creates a cookie with just a name and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            max_age: None,
            http_only: false,
            expired: false,
        }
    }

    /// Creates a removal cookie for the given name
    ///
    /// Sends an empty value with an epoch expiry, which makes the browser
    /// drop the cookie.
    pub fn removal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            path: Some("/".to_string()),
            max_age: None,
            http_only: false,
            expired: true,
        }
    }

    /// Sets the cookie path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets Max-Age in seconds
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Marks the cookie HttpOnly
    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Serializes to a `Set-Cookie` header value
    pub fn encode(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, urlencode(&self.value))];

        if let Some(ref path) = self.path {
            parts.push(format!("Path={}", path));
        }
        if self.expired {
            parts.push("Expires=Thu, 01 Jan 1970 00:00:00 GMT".to_string());
        } else if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age));
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.push("SameSite=Lax".to_string());

        parts.join("; ")
    }

    /// Builds a `Set-Cookie` header value pair for axum's `AppendHeaders`
    pub fn header(&self) -> (axum::http::HeaderName, String) {
        (axum::http::header::SET_COOKIE, self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_cookies() {
        let cookies = Cookies::parse("session=abc123; flash=hello; other=1");
        assert_eq!(cookies.get("session"), Some("abc123"));
        assert_eq!(cookies.get("flash"), Some("hello"));
        assert_eq!(cookies.get("other"), Some("1"));
        assert_eq!(cookies.get("missing"), None);
    }

    #[test]
    fn test_parse_ignores_malformed_pairs() {
        let cookies = Cookies::parse("valid=1; junk; =empty");
        assert_eq!(cookies.get("valid"), Some("1"));
        assert_eq!(cookies.get("junk"), None);
    }

    #[test]
    fn test_parse_decodes_values() {
        let cookies = Cookies::parse("flash=%7B%22kind%22%3A%22info%22%7D");
        assert_eq!(cookies.get("flash"), Some(r#"{"kind":"info"}"#));
    }

    #[test]
    fn test_encode_roundtrip() {
        let payload = r#"{"kind":"info","message":"Task created; done"}"#;
        let encoded = urlencode(payload);
        assert!(!encoded.contains(';'));
        assert!(!encoded.contains(' '));
        assert_eq!(urldecode(&encoded), payload);
    }

    #[test]
    fn test_urldecode_passes_malformed_escapes() {
        assert_eq!(urldecode("100%zz"), "100%zz");
        assert_eq!(urldecode("trailing%"), "trailing%");
    }

    #[test]
    fn test_cookie_encode_attributes() {
        let header = Cookie::new("session", "tok")
            .path("/")
            .max_age(3600)
            .http_only()
            .encode();
        assert_eq!(header, "session=tok; Path=/; Max-Age=3600; HttpOnly; SameSite=Lax");
    }

    #[test]
    fn test_removal_cookie_expires_at_epoch() {
        let header = Cookie::removal("session").encode();
        assert!(header.starts_with("session=; Path=/"));
        assert!(header.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }
}
