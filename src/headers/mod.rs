//! Incremental response-header parsing.
//!
//! The transport replays raw header lines one at a time; the parser turns each
//! into a discrete event (plain entry, cookie mutation, or continuation) and
//! never touches the jar or header map itself. The returned byte count echoes
//! the streaming-callback contract where a handler must report the full line
//! as consumed.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;

/// Canonical form of a header name: `Title-Cased-With-Hyphens`, except names
/// already starting with `X-`, which are kept byte-for-byte as received.
pub fn canonical_name(key: &str) -> String {
    if key.starts_with("X-") {
        return key.to_string();
    }
    key.to_ascii_lowercase()
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// One parsed header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEvent {
    /// A regular header under its canonical name.
    Entry { name: String, value: String },
    /// A `Set-Cookie` line, decoded into a jar mutation.
    Cookie(CookieEvent),
    /// Blank line or continuation without a colon; carries nothing.
    Continuation,
}

/// Jar mutation carried by a `Set-Cookie` line. `domain: None` means the
/// line had no domain attribute and the host of the last-requested URL
/// applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieEvent {
    Set {
        name: String,
        value: String,
        domain: Option<String>,
        expires: Option<DateTime<Utc>>,
    },
    Delete {
        name: String,
        domain: Option<String>,
    },
}

/// Stateless line-at-a-time header parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderParser;

impl HeaderParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses one raw header line. Returns the byte length of the raw line
    /// (full consumption) together with the decoded event.
    pub fn parse_line(&self, line: &str) -> (usize, HeaderEvent) {
        let consumed = line.len();
        let trimmed = line.trim();

        let Some((key, value)) = trimmed.split_once(':') else {
            return (consumed, HeaderEvent::Continuation);
        };
        let key = canonical_name(key.trim());
        let value = value.trim();

        if key == "Set-Cookie" {
            (consumed, HeaderEvent::Cookie(parse_set_cookie(value)))
        } else {
            (
                consumed,
                HeaderEvent::Entry {
                    name: key,
                    value: value.to_string(),
                },
            )
        }
    }
}

/// Sentinel value servers send to drop a cookie.
const DELETED_VALUE: &str = "deleted";

fn parse_set_cookie(value: &str) -> CookieEvent {
    let mut crumbs = value.split(';').map(|crumb| {
        let (k, v) = crumb.split_once('=').unwrap_or((crumb, ""));
        (k.trim().to_string(), v.trim().to_string())
    });

    let (name, cookie_value) = crumbs.next().unwrap_or_default();

    let attributes: HashMap<String, String> = crumbs
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect();
    let domain = attributes
        .get("domain")
        .filter(|d| !d.is_empty())
        .cloned();

    if cookie_value == DELETED_VALUE {
        CookieEvent::Delete { name, domain }
    } else {
        let expires = attributes.get("expires").and_then(|e| parse_expires(e));
        CookieEvent::Set {
            name,
            value: cookie_value,
            domain,
            expires,
        }
    }
}

/// Parses the cookie `expires` attribute. Accepts RFC 2822 dates and the
/// legacy dash-separated Netscape format; anything else means never expires.
pub fn parse_expires(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%a, %d-%b-%Y %H:%M:%S GMT", "%a, %d-%b-%y %H:%M:%S GMT"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    None
}

/// Response-header map keyed by canonical name; later values for the same
/// name overwrite earlier ones within one response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    entries: HashMap<String, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: String) {
        self.entries.insert(name, value);
    }

    /// Looks a header up by any casing of its name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&canonical_name(name)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
