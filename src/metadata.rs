//! Exchange metadata translation.
//!
//! # Responsibilities
//! - Describe one incoming exchange as an immutable record
//! - Translate that record into the flat key/value map the synchronous
//!   handler world expects
//!
//! # Design Decisions
//! - Translation is a pure function; malformed values are the caller's
//!   problem and missing optional fields become explicit null entries
//! - Raw header and query bytes are decoded one byte per character, so the
//!   translation itself can never fail

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;

/// Immutable description of one incoming exchange.
///
/// Created once by the hosting transport and read-only for the lifetime
/// of the adapters attached to it.
#[derive(Debug, Clone, Default)]
pub struct ExchangeDescriptor {
    /// Request method.
    pub method: Method,

    /// Mount prefix the handler is served under, empty at the root.
    pub root_path: String,

    /// Request path below the mount prefix.
    pub path: String,

    /// Raw query string bytes.
    pub query_string: Bytes,

    /// Connection scheme; treated as "http" when absent.
    pub scheme: Option<String>,

    /// Local endpoint as (host, port); the port may be unset for
    /// unix-domain style listeners.
    pub server: Option<(String, Option<u16>)>,

    /// Peer endpoint as (host, port).
    pub client: Option<(String, u16)>,

    /// Ordered header list as raw name/value byte pairs. Names are
    /// case-insensitive and may repeat.
    pub headers: Vec<(Bytes, Bytes)>,
}

impl ExchangeDescriptor {
    /// Descriptor for `method` and `path` with everything else defaulted.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Flat key/value mapping handed to the synchronous handler.
///
/// Values are `None` when the descriptor field feeding them was absent;
/// the translation never drops a key because its source was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataMap {
    entries: HashMap<String, Option<String>>,
}

impl MetadataMap {
    /// Look up a key, yielding its text only when a value is present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    /// Whether the key exists at all, even with a null value.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether the key exists with an explicitly null value.
    pub fn is_null(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(None))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        self.entries.insert(key.to_owned(), value);
    }

    /// Insert a header value, joining onto an existing entry in arrival
    /// order when the key repeats.
    fn push_header(&mut self, key: String, value: String) {
        match self.entries.get_mut(&key) {
            Some(Some(existing)) => {
                existing.push_str("; ");
                existing.push_str(&value);
            }
            _ => {
                self.entries.insert(key, Some(value));
            }
        }
    }
}

/// Decode raw bytes one byte per character.
fn byte_text(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Translate an exchange descriptor into the handler's metadata map.
///
/// Deterministic and side-effect free. Every header becomes exactly one
/// entry: `content-type` and `content-length` keep their bare names, all
/// others are prefixed with `HTTP_`, and names are upper-cased with
/// dashes turned into underscores. Repeated names coalesce with `"; "`.
pub fn translate(descriptor: &ExchangeDescriptor) -> MetadataMap {
    let mut map = MetadataMap::default();

    map.set("REQUEST_METHOD", Some(descriptor.method.as_str().to_owned()));
    map.set("SCRIPT_NAME", Some(descriptor.root_path.clone()));
    map.set(
        "PATH_INFO",
        Some(format!("{}{}", descriptor.root_path, descriptor.path)),
    );
    map.set("QUERY_STRING", Some(byte_text(&descriptor.query_string)));

    let (server_name, server_port) = match &descriptor.server {
        Some((host, port)) => (Some(host.clone()), port.map(|p| p.to_string())),
        None => (None, None),
    };
    map.set("SERVER_NAME", server_name);
    map.set("SERVER_PORT", server_port);

    let (client_host, client_port) = match &descriptor.client {
        Some((host, port)) => (Some(host.clone()), Some(port.to_string())),
        None => (None, None),
    };
    map.set("REMOTE_HOST", client_host.clone());
    map.set("REMOTE_ADDR", client_host);
    map.set("REMOTE_PORT", client_port);

    map.set(
        "URL_SCHEME",
        Some(
            descriptor
                .scheme
                .clone()
                .unwrap_or_else(|| "http".to_owned()),
        ),
    );

    for (name, value) in &descriptor.headers {
        let canonical = byte_text(name).replace('-', "_").to_uppercase();
        let key = if canonical == "CONTENT_TYPE" || canonical == "CONTENT_LENGTH" {
            canonical
        } else {
            format!("HTTP_{canonical}")
        };
        map.push_header(key, byte_text(value));
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_request_keys() {
        let descriptor = ExchangeDescriptor {
            method: Method::GET,
            path: "/x".into(),
            query_string: Bytes::from_static(b"a=1"),
            headers: vec![
                (Bytes::from_static(b"x-a"), Bytes::from_static(b"1")),
                (Bytes::from_static(b"x-a"), Bytes::from_static(b"2")),
            ],
            ..ExchangeDescriptor::default()
        };

        let map = translate(&descriptor);
        assert_eq!(map.get("REQUEST_METHOD"), Some("GET"));
        assert_eq!(map.get("PATH_INFO"), Some("/x"));
        assert_eq!(map.get("QUERY_STRING"), Some("a=1"));
        assert_eq!(map.get("HTTP_X_A"), Some("1; 2"));
    }

    #[test]
    fn test_mount_prefix_prepends_path() {
        let mut descriptor = ExchangeDescriptor::new(Method::GET, "/users");
        descriptor.root_path = "/app".into();

        let map = translate(&descriptor);
        assert_eq!(map.get("SCRIPT_NAME"), Some("/app"));
        assert_eq!(map.get("PATH_INFO"), Some("/app/users"));
    }

    #[test]
    fn test_content_headers_stay_bare() {
        let mut descriptor = ExchangeDescriptor::new(Method::POST, "/submit");
        descriptor.headers = vec![
            (
                Bytes::from_static(b"content-type"),
                Bytes::from_static(b"text/plain"),
            ),
            (Bytes::from_static(b"content-length"), Bytes::from_static(b"4")),
            (
                Bytes::from_static(b"x-content-type"),
                Bytes::from_static(b"decoy"),
            ),
        ];

        let map = translate(&descriptor);
        assert_eq!(map.get("CONTENT_TYPE"), Some("text/plain"));
        assert_eq!(map.get("CONTENT_LENGTH"), Some("4"));
        assert_eq!(map.get("HTTP_X_CONTENT_TYPE"), Some("decoy"));
        assert!(!map.contains("HTTP_CONTENT_TYPE"));
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let mut descriptor = ExchangeDescriptor::new(Method::GET, "/");
        descriptor.headers = vec![
            (Bytes::from_static(b"X-Mixed"), Bytes::from_static(b"a")),
            (Bytes::from_static(b"x-mixed"), Bytes::from_static(b"b")),
        ];

        let map = translate(&descriptor);
        assert_eq!(map.get("HTTP_X_MIXED"), Some("a; b"));
    }

    #[test]
    fn test_missing_endpoints_become_null_entries() {
        let descriptor = ExchangeDescriptor::new(Method::GET, "/");
        let map = translate(&descriptor);

        assert!(map.is_null("SERVER_NAME"));
        assert!(map.is_null("SERVER_PORT"));
        assert!(map.is_null("REMOTE_ADDR"));
        assert!(map.is_null("REMOTE_HOST"));
        assert!(map.is_null("REMOTE_PORT"));
        assert_eq!(map.get("URL_SCHEME"), Some("http"));
    }

    #[test]
    fn test_endpoints_translate_to_text() {
        let mut descriptor = ExchangeDescriptor::new(Method::GET, "/");
        descriptor.scheme = Some("https".into());
        descriptor.server = Some(("10.0.0.1".into(), Some(8443)));
        descriptor.client = Some(("192.168.1.7".into(), 52100));

        let map = translate(&descriptor);
        assert_eq!(map.get("SERVER_NAME"), Some("10.0.0.1"));
        assert_eq!(map.get("SERVER_PORT"), Some("8443"));
        assert_eq!(map.get("REMOTE_ADDR"), Some("192.168.1.7"));
        assert_eq!(map.get("REMOTE_PORT"), Some("52100"));
        assert_eq!(map.get("URL_SCHEME"), Some("https"));
    }

    #[test]
    fn test_server_without_port() {
        let mut descriptor = ExchangeDescriptor::new(Method::GET, "/");
        descriptor.server = Some(("/tmp/handler.sock".into(), None));

        let map = translate(&descriptor);
        assert_eq!(map.get("SERVER_NAME"), Some("/tmp/handler.sock"));
        assert!(map.is_null("SERVER_PORT"));
    }

    #[test]
    fn test_high_bytes_decode_one_to_one() {
        let mut descriptor = ExchangeDescriptor::new(Method::GET, "/");
        descriptor.query_string = Bytes::from_static(&[b'q', b'=', 0xE9]);

        let map = translate(&descriptor);
        assert_eq!(map.get("QUERY_STRING"), Some("q=\u{e9}"));
    }
}
