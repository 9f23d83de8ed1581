//! Legacy route classification.
//!
//! # Responsibilities
//! - Parse the legacy pattern table (`/posts`, `/tags/:tag/page/:page`)
//! - Recognize request paths from the pre-localization URL scheme
//! - Detect patterns that could match the same path
//!
//! # Design Decisions
//! - Patterns are tagged variants: exact literal or parametrized
//! - A parameter matches exactly one non-empty segment
//! - At most two parameters per pattern
//! - Overlap is a configuration defect caught at startup, so table order
//!   never decides a match

use serde::Serialize;

use crate::config::validation::ValidationError;
use crate::locale::RequestPath;

/// Maximum free segments in one pattern.
pub const MAX_PARAMS: usize = 2;

/// One segment of a parametrized pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A recognized pre-localization path shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyPattern {
    /// An exact literal path such as `/about`.
    Exact { source: String, segments: Vec<String> },
    /// A path with one or two free segments such as `/tags/:tag`.
    Parametrized { source: String, segments: Vec<Segment> },
}

/// Whether a legacy match came from a literal or a parametrized pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyKind {
    Static,
    Dynamic,
}

/// A successful classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyMatch {
    pub kind: LegacyKind,
    /// The pattern that matched, as configured.
    pub pattern: String,
    /// Captured parameters, in pattern order.
    pub params: Vec<(String, String)>,
    /// The path to re-root under a locale prefix.
    pub remainder: String,
}

impl LegacyPattern {
    /// Parse a pattern. `:name` marks a free segment.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidLegacyPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Err(invalid("the root path is not a legacy route"));
        }

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        for part in body.split('/') {
            if part.is_empty() {
                return Err(invalid("empty segment"));
            }
            match part.strip_prefix(':') {
                Some(name) => {
                    if name.is_empty() {
                        return Err(invalid("unnamed parameter"));
                    }
                    if names.contains(&name) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    names.push(name);
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        if names.len() > MAX_PARAMS {
            return Err(invalid("more than two parameters"));
        }

        let source = raw.to_string();
        if names.is_empty() {
            let segments = segments
                .into_iter()
                .filter_map(|s| match s {
                    Segment::Literal(l) => Some(l),
                    Segment::Param(_) => None,
                })
                .collect();
            Ok(LegacyPattern::Exact { source, segments })
        } else {
            Ok(LegacyPattern::Parametrized { source, segments })
        }
    }

    /// The pattern as configured.
    pub fn source(&self) -> &str {
        match self {
            LegacyPattern::Exact { source, .. } | LegacyPattern::Parametrized { source, .. } => source,
        }
    }

    pub fn kind(&self) -> LegacyKind {
        match self {
            LegacyPattern::Exact { .. } => LegacyKind::Static,
            LegacyPattern::Parametrized { .. } => LegacyKind::Dynamic,
        }
    }

    /// The first segment when it is a literal.
    pub fn first_literal(&self) -> Option<&str> {
        match self {
            LegacyPattern::Exact { segments, .. } => segments.first().map(String::as_str),
            LegacyPattern::Parametrized { segments, .. } => match segments.first() {
                Some(Segment::Literal(l)) => Some(l.as_str()),
                _ => None,
            },
        }
    }

    fn segment_view(&self) -> Vec<Segment> {
        match self {
            LegacyPattern::Exact { segments, .. } => {
                segments.iter().cloned().map(Segment::Literal).collect()
            }
            LegacyPattern::Parametrized { segments, .. } => segments.clone(),
        }
    }

    /// Match path segments, returning captured parameters.
    pub fn capture(&self, path: &[&str]) -> Option<Vec<(String, String)>> {
        match self {
            LegacyPattern::Exact { segments, .. } => {
                (segments.len() == path.len() && segments.iter().zip(path).all(|(a, b)| a == b))
                    .then(Vec::new)
            }
            LegacyPattern::Parametrized { segments, .. } => {
                if segments.len() != path.len() {
                    return None;
                }
                let mut params = Vec::new();
                for (segment, value) in segments.iter().zip(path) {
                    match segment {
                        Segment::Literal(l) if l == value => {}
                        Segment::Literal(_) => return None,
                        Segment::Param(name) => params.push((name.clone(), value.to_string())),
                    }
                }
                Some(params)
            }
        }
    }

    /// True if some path would match both patterns.
    pub fn overlaps(&self, other: &LegacyPattern) -> bool {
        let a = self.segment_view();
        let b = other.segment_view();
        a.len() == b.len()
            && a.iter().zip(&b).all(|pair| match pair {
                (Segment::Literal(x), Segment::Literal(y)) => x == y,
                _ => true,
            })
    }
}

/// The compiled legacy route table.
#[derive(Debug, Clone, Default)]
pub struct LegacyRouteClassifier {
    patterns: Vec<LegacyPattern>,
}

impl LegacyRouteClassifier {
    /// Compile a pattern table, rejecting malformed or overlapping patterns.
    pub fn from_patterns<S: AsRef<str>>(raw: &[S]) -> Result<Self, ValidationError> {
        let mut patterns: Vec<LegacyPattern> = Vec::with_capacity(raw.len());
        for r in raw {
            let pattern = LegacyPattern::parse(r.as_ref())?;
            if let Some(existing) = patterns.iter().find(|p| p.overlaps(&pattern)) {
                return Err(ValidationError::OverlappingLegacyPatterns {
                    first: existing.source().to_string(),
                    second: pattern.source().to_string(),
                });
            }
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[LegacyPattern] {
        &self.patterns
    }

    /// Classify a path. A trailing slash is tolerated.
    pub fn classify(&self, path: &RequestPath) -> Option<LegacyMatch> {
        let segments: Vec<&str> = path.segments().collect();
        if segments.is_empty() {
            return None;
        }

        self.patterns.iter().find_map(|pattern| {
            pattern.capture(&segments).map(|params| LegacyMatch {
                kind: pattern.kind(),
                pattern: pattern.source().to_string(),
                params,
                remainder: path.as_str().to_string(),
            })
        })
    }
}
