//! Request paths and locale prefix mapping.
//!
//! # Responsibilities
//! - Represent a request path that always starts with `/`
//! - Split a path into (locale, remainder) when segment 0 is a known prefix
//! - Add or strip locale prefixes for switcher and alternate links
//!
//! # Design Decisions
//! - Prefix matching is exact and case-sensitive (`/EN` is not `/en`)
//! - A prefix only matches a whole segment (`/english` is not `/en`)
//! - The remainder is never empty; a bare prefix maps to `/`

use std::fmt;

use crate::locale::registry::{Locale, LocaleRegistry};

/// An immutable request path. Always starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestPath(String);

impl RequestPath {
    /// Parse a raw path. Returns `None` unless it starts with `/`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.starts_with('/') {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Non-empty segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// First path segment, if any.
    pub fn prefix_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// Last path segment, if any.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments().last()
    }

    /// `rest` under a single leading slash; `/` when it is empty.
    pub fn rooted(rest: &str) -> Self {
        Self(format!("/{}", rest.trim_start_matches('/')))
    }

    /// The path with its first segment removed; `/` when nothing remains.
    /// Runs of slashes after the removed segment collapse, so the result is
    /// never protocol-relative.
    pub fn without_first_segment(&self) -> RequestPath {
        let rest = self.0.trim_start_matches('/');
        match rest.find('/') {
            Some(idx) => RequestPath::rooted(&rest[idx..]),
            None => RequestPath::root(),
        }
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join a locale prefix and a remainder. A remainder of `/` collapses to the bare prefix.
pub fn join_prefix(prefix: &str, remainder: &str) -> String {
    if remainder.is_empty() || remainder == "/" {
        prefix.to_string()
    } else if remainder.starts_with('/') {
        format!("{}{}", prefix, remainder)
    } else {
        format!("{}/{}", prefix, remainder)
    }
}

/// Splits request paths on locale prefixes.
#[derive(Debug, Clone, Copy)]
pub struct PathLocaleMapper<'a> {
    registry: &'a LocaleRegistry,
}

impl<'a> PathLocaleMapper<'a> {
    pub fn new(registry: &'a LocaleRegistry) -> Self {
        Self { registry }
    }

    /// Split a path into its locale (if segment 0 is a known prefix) and the remainder.
    ///
    /// Without a known prefix the original path is returned unchanged.
    pub fn split(&self, path: &RequestPath) -> (Option<&'a Locale>, RequestPath) {
        // Only the very first segment counts; "//en" has an empty segment 0.
        let first = path.as_str()[1..].split('/').next().unwrap_or_default();
        match self.registry.locale_for_prefix(first) {
            Some(locale) if !first.is_empty() => (Some(locale), path.without_first_segment()),
            _ => (None, path.clone()),
        }
    }

    /// Remove any known locale prefix.
    pub fn strip(&self, path: &RequestPath) -> RequestPath {
        self.split(path).1
    }

    /// Re-root a path under `locale`, replacing any existing prefix.
    pub fn localize(&self, path: &RequestPath, locale: &Locale) -> String {
        let remainder = self.strip(path);
        join_prefix(locale.prefix(), remainder.as_str())
    }

    /// The same page under every supported locale, in registry order.
    pub fn alternate_paths(&self, path: &RequestPath) -> Vec<(Locale, String)> {
        self.registry
            .supported_locales()
            .iter()
            .map(|l| (l.clone(), self.localize(path, l)))
            .collect()
    }
}
