//! JSON encoding of requests and responses

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Write;

/// JSON codec used by the client
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    /// Escape every non-ASCII character as `\uXXXX`
    pub force_ascii: bool,
}

impl JsonSerializer {
    pub fn new(force_ascii: bool) -> Self {
        Self { force_ascii }
    }

    pub fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        let json = serde_json::to_string(value)?;
        if self.force_ascii {
            Ok(encode_ascii(&json).into_bytes())
        } else {
            Ok(json.into_bytes())
        }
    }

    pub fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(bytes)
    }
}

/// Rewrite JSON text so it contains only ASCII.
///
/// Non-ASCII characters can only occur inside JSON strings, where a
/// `\uXXXX` escape denotes the same character. Characters outside the BMP
/// become a UTF-16 surrogate pair.
pub fn encode_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
    out
}
