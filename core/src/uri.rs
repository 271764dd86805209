//! Connection URI parsing.
//!
//! `parse` turns a URI of the shape `scheme://host[:port][/path]?[query]`
//! (or `scheme:///absolute/path?[query]` for the local-socket form) into a
//! flat string→string mapping. No type coercion happens here: a port or a
//! `timeout=0.5` query value stays the parsed string, and the caller decides
//! whether and when to coerce.

use std::collections::BTreeMap;

use crate::errors::ParamsError;


/// Scheme that addresses a local socket by filesystem path instead of
/// host and port.
const LOCAL_SOCKET_SCHEME: &str = "unix";


/// Parse a connection URI into a string→string mapping.
///
/// The result always contains `scheme` and `host`. The local-socket form
/// adds `path` with a fixed `host` of `localhost`; the network form adds
/// `port` when a port segment is present. Query pairs are merged in last.
///
/// Query handling is lenient and asymmetric on purpose:
/// - `key=value` is kept as-is,
/// - `key=` is kept with an empty value,
/// - a bare `key` with no `=` at all is dropped entirely.
///
/// # Errors
///
/// Returns [`ParamsError::InvalidUri`] when the scheme/authority structure
/// cannot be decomposed: no `://` separator, an empty scheme or host, an
/// authority that is not a plain `host[:port]` pair, a non-numeric port
/// segment, or a local-socket target that is not an absolute path.
pub fn parse(uri: &str) -> Result<BTreeMap<String, String>, ParamsError> {
    let invalid = || ParamsError::InvalidUri(uri.to_string());

    let (scheme, rest) = uri.split_once("://").ok_or_else(invalid)?;
    if scheme.is_empty() {
        return Err(invalid());
    }

    let (target, query) = match rest.split_once('?') {
        Some((target, query)) => (target, Some(query)),
        None => (rest, None),
    };

    let mut parsed = BTreeMap::new();
    parsed.insert("scheme".to_string(), scheme.to_string());

    if scheme == LOCAL_SOCKET_SCHEME {
        // Local-socket form: the whole target is a filesystem path.
        if !target.starts_with('/') {
            return Err(invalid());
        }
        parsed.insert("host".to_string(), "localhost".to_string());
        parsed.insert("path".to_string(), percent_decode(target));
    } else {
        // Network form: host[:port]. A trailing /path segment carries no
        // meaning for a network connection and is ignored.
        let authority = match target.split_once('/') {
            Some((authority, _)) => authority,
            None => target,
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        };
        // A colon left in the host segment means the authority was not a
        // plain host[:port] shape.
        if host.is_empty() || host.contains(':') {
            return Err(invalid());
        }
        parsed.insert("host".to_string(), host.to_string());
        if let Some(port) = port {
            if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            parsed.insert("port".to_string(), port.to_string());
        }
    }

    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                if !key.is_empty() {
                    parsed.insert(key.to_string(), value.to_string());
                }
            }
            // No '=' at all: the pair is dropped.
        }
    }

    Ok(parsed)
}


/// Decode `%XX` escapes in a path segment. Malformed escapes are copied
/// through verbatim rather than rejected.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}


fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
