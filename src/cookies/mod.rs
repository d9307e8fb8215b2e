//! Per-connection cookie jar.
//!
//! Cookies are keyed by name and then domain, with at most one record per
//! (name, domain) pair. Expired records are purged lazily while selecting
//! cookies for a request. The whole mapping round-trips through serde so a
//! caller can persist and restore a session; nothing is written to disk
//! implicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::headers::CookieEvent;

/// Stored value and optional expiry for one (name, domain) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub value: String,
    /// `None` means the cookie never expires.
    pub expires: Option<DateTime<Utc>>,
}

/// The jar's full mapping: cookie name -> domain -> record.
pub type CookieMap = BTreeMap<String, BTreeMap<String, CookieRecord>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieJar {
    cookies: CookieMap,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts the record for (name, domain).
    pub fn set(
        &mut self,
        name: impl Into<String>,
        domain: impl Into<String>,
        value: impl Into<String>,
        expires: Option<DateTime<Utc>>,
    ) {
        self.cookies.entry(name.into()).or_default().insert(
            domain.into(),
            CookieRecord {
                value: value.into(),
                expires,
            },
        );
    }

    /// Removes the (name, domain) entry, dropping the name entirely when no
    /// other domain holds it.
    pub fn delete(&mut self, name: &str, domain: &str) {
        if let Some(domains) = self.cookies.get_mut(name) {
            domains.remove(domain);
            if domains.is_empty() {
                self.cookies.remove(name);
            }
        }
    }

    /// Applies a parsed `Set-Cookie` event; `default_domain` is the host of
    /// the last-requested URL and fills in for lines without a domain
    /// attribute.
    pub fn apply(&mut self, event: CookieEvent, default_domain: &str) {
        match event {
            CookieEvent::Set {
                name,
                value,
                domain,
                expires,
            } => {
                let domain = domain.unwrap_or_else(|| default_domain.to_string());
                log::debug!("cookie set {name} for {domain}");
                self.set(name, domain, value, expires);
            }
            CookieEvent::Delete { name, domain } => {
                let domain = domain.unwrap_or_else(|| default_domain.to_string());
                log::debug!("cookie deleted {name} for {domain}");
                self.delete(&name, &domain);
            }
        }
    }

    /// Selects the cookies applicable to a request against `host`, purging
    /// expired records on the way.
    ///
    /// A domain is eligible when it is empty or when `"." + host` contains it
    /// as a substring. An exact host match wins and stops the scan for that
    /// name; otherwise any eligible domain's value is taken. At most one
    /// value per name is returned, and names left without domains after the
    /// purge are dropped from the jar.
    pub fn select(&mut self, host: &str) -> Vec<(String, String)> {
        let now = Utc::now();
        let dotted = format!(".{host}");
        let mut selected = Vec::new();
        let mut exhausted = Vec::new();

        for (name, domains) in self.cookies.iter_mut() {
            let expired: Vec<String> = domains
                .iter()
                .filter(|(_, record)| record.expires.is_some_and(|at| at < now))
                .map(|(domain, _)| domain.clone())
                .collect();
            for domain in expired {
                log::debug!("cookie {name} for {domain} expired, purged");
                domains.remove(&domain);
            }

            let mut chosen: Option<String> = None;
            for (domain, record) in domains.iter() {
                if domain.is_empty() || dotted.contains(domain.as_str()) {
                    chosen = Some(record.value.clone());
                    if domain == host {
                        break;
                    }
                }
            }

            if domains.is_empty() {
                exhausted.push(name.clone());
            } else if let Some(value) = chosen {
                selected.push((name.clone(), value));
            }
        }

        for name in exhausted {
            self.cookies.remove(&name);
        }

        selected
    }

    /// `Cookie` request-header value for `host`, or `None` when nothing
    /// applies.
    pub fn cookie_header(&mut self, host: &str) -> Option<String> {
        let selected = self.select(host);
        if selected.is_empty() {
            return None;
        }
        Some(
            selected
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Full mapping, suitable for external persistence.
    pub fn export(&self) -> CookieMap {
        self.cookies.clone()
    }

    /// Replaces the jar's contents with a previously exported mapping.
    pub fn load(&mut self, cookies: CookieMap) {
        self.cookies = cookies;
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn select_prefers_exact_host_match() {
        let mut jar = CookieJar::new();
        jar.set("id", "b", "broad", None);
        jar.set("id", "a.b", "exact", None);
        let selected = jar.select("a.b");
        assert_eq!(selected, vec![("id".to_string(), "exact".to_string())]);
    }

    #[test]
    fn select_accepts_parent_domain_suffix() {
        let mut jar = CookieJar::new();
        jar.set("id", "b", "parent", None);
        assert_eq!(
            jar.select("a.b"),
            vec![("id".to_string(), "parent".to_string())]
        );
        assert!(jar.select("other.c").is_empty());
    }

    #[test]
    fn empty_domain_matches_every_host() {
        let mut jar = CookieJar::new();
        jar.set("id", "", "anywhere", None);
        assert_eq!(
            jar.select("x.y"),
            vec![("id".to_string(), "anywhere".to_string())]
        );
    }

    #[test]
    fn expired_cookies_are_purged_on_selection() {
        let mut jar = CookieJar::new();
        jar.set("id", "a.b", "42", Some(Utc::now() - Duration::hours(1)));
        assert!(jar.select("a.b").is_empty());
        assert!(jar.is_empty());
    }

    #[test]
    fn unexpired_and_never_expiring_survive() {
        let mut jar = CookieJar::new();
        jar.set("fresh", "a.b", "1", Some(Utc::now() + Duration::hours(1)));
        jar.set("forever", "a.b", "2", None);
        let mut selected = jar.select("a.b");
        selected.sort();
        assert_eq!(
            selected,
            vec![
                ("forever".to_string(), "2".to_string()),
                ("fresh".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn at_most_one_value_per_name() {
        let mut jar = CookieJar::new();
        jar.set("id", "b", "one", None);
        jar.set("id", ".a.b", "two", None);
        let selected = jar.select("a.b");
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn delete_event_removes_entry() {
        let mut jar = CookieJar::new();
        jar.set("sess", "a.b", "abc", None);
        jar.apply(
            CookieEvent::Delete {
                name: "sess".to_string(),
                domain: None,
            },
            "a.b",
        );
        assert!(jar.is_empty());
    }

    #[test]
    fn apply_set_uses_default_domain() {
        let mut jar = CookieJar::new();
        jar.apply(
            CookieEvent::Set {
                name: "sess".to_string(),
                value: "abc".to_string(),
                domain: None,
                expires: None,
            },
            "a.b",
        );
        assert_eq!(
            jar.select("a.b"),
            vec![("sess".to_string(), "abc".to_string())]
        );
    }

    #[test]
    fn export_and_load_round_trip() {
        let mut jar = CookieJar::new();
        jar.set("id", "a.b", "42", None);
        let snapshot = jar.export();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: CookieMap = serde_json::from_str(&json).unwrap();

        let mut other = CookieJar::new();
        other.load(restored);
        assert_eq!(
            other.select("a.b"),
            vec![("id".to_string(), "42".to_string())]
        );
    }

    #[test]
    fn cookie_header_joins_pairs() {
        let mut jar = CookieJar::new();
        jar.set("a", "a.b", "1", None);
        jar.set("b", "a.b", "2", None);
        assert_eq!(jar.cookie_header("a.b"), Some("a=1; b=2".to_string()));
        assert_eq!(jar.cookie_header("nope.c"), None);
    }
}
