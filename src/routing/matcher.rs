//! Pass-through path matching.
//!
//! # Responsibilities
//! - Match reserved prefixes on a segment boundary (assets, API)
//! - Match exact well-known files (robots, sitemap, feed)
//! - Match file-looking paths (a dot in the final segment)
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - Empty matcher set never matches

use crate::config::schema::PassthroughConfig;
use crate::locale::RequestPath;

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &RequestPath) -> bool;
}

/// Matches a path prefix on a segment boundary.
#[derive(Debug, Clone)]
pub struct SegmentPrefixMatcher {
    prefix: String,
}

impl SegmentPrefixMatcher {
    /// Create a new prefix matcher. A trailing slash on the prefix is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() },
        }
    }
}

impl Matcher for SegmentPrefixMatcher {
    fn matches(&self, path: &RequestPath) -> bool {
        let path = path.as_str();
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix == "/",
            None => false,
        }
    }
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &RequestPath) -> bool {
        path.as_str() == self.path
    }
}

/// Matches paths whose final segment looks like a file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExtensionMatcher;

impl Matcher for FileExtensionMatcher {
    fn matches(&self, path: &RequestPath) -> bool {
        // A trailing slash means a directory-style page, not a file.
        if path.as_str().ends_with('/') {
            return false;
        }
        path.last_segment().is_some_and(|s| s.contains('.'))
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Build the pass-through rule set from configuration.
    pub fn passthrough(config: &PassthroughConfig) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        for prefix in &config.prefixes {
            matchers.push(Box::new(SegmentPrefixMatcher::new(prefix.as_str())));
        }
        for path in &config.paths {
            matchers.push(Box::new(ExactPathMatcher::new(path.as_str())));
        }
        if config.extension_rule {
            matchers.push(Box::new(FileExtensionMatcher));
        }
        Self::new(matchers)
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &RequestPath) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}
