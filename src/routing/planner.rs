//! Redirect planning: the per-request routing state machine.
//!
//! # States
//! Evaluated in this fixed order; the first that applies decides.
//! ```text
//! PassThrough       asset/API prefix, well-known file, file-looking path → PassThrough
//! AlreadyLocalized  segment 0 is a locale prefix                       → Serve(locale)
//! RootPath          exactly "/"                                        → 302 prefix
//! LegacyStatic      literal legacy route                               → 301 prefix + path
//! LegacyDynamic     parametrized legacy route                          → 301 prefix + path
//! UnknownPrefix     segment 0 looks like an unsupported language tag   → 302 stripped path
//! Unrouted          nothing matched                                    → Serve(preferred locale)
//! ```
//!
//! # Design Decisions
//! - Total: every input has a decision, unparseable paths pass through
//! - Every redirect target re-plans to Serve or PassThrough (no chains)
//! - Stacked unknown prefixes (`/fr/de/about`) are stripped in one linear
//!   pass, so planning cost grows with path length, not its square
//! - Root and unknown-prefix redirects are temporary because they depend
//!   on the visitor's preference; legacy redirects are permanent

use serde::Serialize;

use crate::locale::{
    join_prefix, parse_language_id, Locale, LocaleRegistry, PathLocaleMapper, PreferenceResolver,
    PreferenceSignals, PreferenceSource, RequestPath, Resolution,
};
use crate::routing::legacy::{LegacyKind, LegacyRouteClassifier};
use crate::routing::matcher::{AnyMatcher, Matcher};

/// Which rule decided a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingState {
    PassThrough,
    AlreadyLocalized,
    RootPath,
    LegacyStatic,
    LegacyDynamic,
    UnknownPrefix,
    Unrouted,
}

impl RoutingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingState::PassThrough => "pass_through",
            RoutingState::AlreadyLocalized => "already_localized",
            RoutingState::RootPath => "root_path",
            RoutingState::LegacyStatic => "legacy_static",
            RoutingState::LegacyDynamic => "legacy_dynamic",
            RoutingState::UnknownPrefix => "unknown_prefix",
            RoutingState::Unrouted => "unrouted",
        }
    }
}

/// Redirect status. Only 301 and 302 are ever issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectStatus {
    Permanent,
    Temporary,
}

impl RedirectStatus {
    pub fn code(&self) -> u16 {
        match self {
            RedirectStatus::Permanent => 301,
            RedirectStatus::Temporary => 302,
        }
    }
}

/// The routing decision for one request. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RedirectDecision {
    /// Render `remainder` in `locale`.
    Serve { locale: Locale, remainder: String },
    /// Send the client to `target` (a path; see [`RoutingOutcome::location`]).
    Redirect { status: RedirectStatus, target: String },
    /// Skip locale logic; hand the request on unchanged.
    PassThrough,
}

impl RedirectDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, RedirectDecision::Redirect { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            RedirectDecision::Redirect { status, .. } => Some(status.code()),
            _ => None,
        }
    }

    pub fn outcome_label(&self) -> &'static str {
        match self {
            RedirectDecision::Serve { .. } => "serve",
            RedirectDecision::Redirect { status: RedirectStatus::Permanent, .. } => "redirect_301",
            RedirectDecision::Redirect { status: RedirectStatus::Temporary, .. } => "redirect_302",
            RedirectDecision::PassThrough => "pass_through",
        }
    }
}

/// The request inputs the planner consumes.
#[derive(Debug, Clone, Default)]
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
    /// Scheme and authority, e.g. "https://example.com".
    pub origin: Option<&'a str>,
    pub stored_locale: Option<&'a str>,
    pub browser_locales: &'a [String],
}

impl<'a> RequestContext<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Build the absolute (or, without an origin, relative) URL for a target path,
    /// reattaching this request's query and fragment verbatim.
    pub fn location_for(&self, target: &str) -> String {
        let mut location = String::new();
        if let Some(origin) = self.origin {
            location.push_str(origin.trim_end_matches('/'));
        }
        location.push_str(target);
        if let Some(query) = self.query.filter(|q| !q.is_empty()) {
            location.push('?');
            location.push_str(query);
        }
        if let Some(fragment) = self.fragment.filter(|f| !f.is_empty()) {
            location.push('#');
            location.push_str(fragment);
        }
        location
    }
}

/// The full result of planning a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingOutcome {
    pub state: RoutingState,
    pub decision: RedirectDecision,
    /// Tier that picked the locale, when a preference was consulted.
    pub source: Option<PreferenceSource>,
    /// `Location` header value for redirects.
    pub location: Option<String>,
}

struct PagePlan {
    state: RoutingState,
    decision: RedirectDecision,
    source: Option<PreferenceSource>,
}

/// Combines path mapping, legacy classification and preference resolution
/// into one decision.
#[derive(Debug, Clone, Copy)]
pub struct RedirectPlanner<'a> {
    registry: &'a LocaleRegistry,
    passthrough: &'a AnyMatcher,
    legacy: &'a LegacyRouteClassifier,
    collapse_chains: bool,
}

impl<'a> RedirectPlanner<'a> {
    pub fn new(
        registry: &'a LocaleRegistry,
        passthrough: &'a AnyMatcher,
        legacy: &'a LegacyRouteClassifier,
        collapse_chains: bool,
    ) -> Self {
        Self {
            registry,
            passthrough,
            legacy,
            collapse_chains,
        }
    }

    /// Plan one request.
    pub fn plan(&self, ctx: &RequestContext<'_>) -> RoutingOutcome {
        let plan = match RequestPath::parse(ctx.path) {
            Some(path) => self.plan_path(&path, ctx),
            None => Self::pass_through(),
        };

        let location = match &plan.decision {
            RedirectDecision::Redirect { target, .. } => Some(ctx.location_for(target)),
            _ => None,
        };

        RoutingOutcome {
            state: plan.state,
            decision: plan.decision,
            source: plan.source,
            location,
        }
    }

    fn pass_through() -> PagePlan {
        PagePlan {
            state: RoutingState::PassThrough,
            decision: RedirectDecision::PassThrough,
            source: None,
        }
    }

    fn plan_path(&self, path: &RequestPath, ctx: &RequestContext<'_>) -> PagePlan {
        if let Some(plan) = self.plan_known(path, ctx) {
            return plan;
        }

        match path.prefix_segment() {
            Some(segment) if self.is_unknown_prefix(segment) => self.plan_unknown_prefix(path, ctx),
            _ => self.plan_unrouted(path, ctx),
        }
    }

    /// The states decided before the unknown-prefix check.
    fn plan_known(&self, path: &RequestPath, ctx: &RequestContext<'_>) -> Option<PagePlan> {
        if self.passthrough.matches(path) {
            return Some(Self::pass_through());
        }

        let mapper = PathLocaleMapper::new(self.registry);
        let (url_locale, remainder) = mapper.split(path);

        if let Some(locale) = url_locale {
            let resolution = self.resolve(ctx, Some(locale));
            return Some(PagePlan {
                state: RoutingState::AlreadyLocalized,
                decision: RedirectDecision::Serve {
                    locale: resolution.locale,
                    remainder: remainder.as_str().to_string(),
                },
                source: Some(resolution.source),
            });
        }

        if path.is_root() {
            let resolution = self.resolve(ctx, None);
            return Some(PagePlan {
                state: RoutingState::RootPath,
                decision: RedirectDecision::Redirect {
                    status: RedirectStatus::Temporary,
                    target: resolution.locale.prefix().to_string(),
                },
                source: Some(resolution.source),
            });
        }

        let legacy = self.legacy.classify(path)?;
        let resolution = self.resolve(ctx, None);
        let state = match legacy.kind {
            LegacyKind::Static => RoutingState::LegacyStatic,
            LegacyKind::Dynamic => RoutingState::LegacyDynamic,
        };
        Some(PagePlan {
            state,
            decision: RedirectDecision::Redirect {
                status: RedirectStatus::Permanent,
                target: join_prefix(resolution.locale.prefix(), &legacy.remainder),
            },
            source: Some(resolution.source),
        })
    }

    fn plan_unknown_prefix(&self, path: &RequestPath, ctx: &RequestContext<'_>) -> PagePlan {
        let (target, source) = if self.collapse_chains {
            let rest = self.strip_unknown_prefixes(path);
            // `rest` no longer starts with an unknown prefix, so one more
            // plan is final.
            let inner = self
                .plan_known(&rest, ctx)
                .unwrap_or_else(|| self.plan_unrouted(&rest, ctx));
            match inner.decision {
                RedirectDecision::Redirect { target, .. } => (target, inner.source),
                _ => (rest.as_str().to_string(), None),
            }
        } else {
            (path.without_first_segment().as_str().to_string(), None)
        };

        PagePlan {
            state: RoutingState::UnknownPrefix,
            decision: RedirectDecision::Redirect {
                status: RedirectStatus::Temporary,
                target,
            },
            source,
        }
    }

    fn plan_unrouted(&self, path: &RequestPath, ctx: &RequestContext<'_>) -> PagePlan {
        let resolution = self.resolve(ctx, None);
        PagePlan {
            state: RoutingState::Unrouted,
            decision: RedirectDecision::Serve {
                locale: resolution.locale,
                remainder: path.as_str().to_string(),
            },
            source: Some(resolution.source),
        }
    }

    fn is_unknown_prefix(&self, segment: &str) -> bool {
        looks_like_language_tag(segment) && self.registry.locale_for_prefix(segment).is_none()
    }

    /// Drop every leading segment that is an unknown prefix.
    fn strip_unknown_prefixes(&self, path: &RequestPath) -> RequestPath {
        let mut rest = path.as_str();
        loop {
            let trimmed = rest.trim_start_matches('/');
            let (segment, tail) = match trimmed.find('/') {
                Some(idx) => trimmed.split_at(idx),
                None => (trimmed, ""),
            };
            if segment.is_empty() || !self.is_unknown_prefix(segment) {
                break;
            }
            rest = tail;
        }

        RequestPath::rooted(rest)
    }

    fn resolve(&self, ctx: &RequestContext<'_>, url_locale: Option<&Locale>) -> Resolution {
        let signals = PreferenceSignals {
            url_locale,
            stored_locale: ctx.stored_locale,
            browser_locales: ctx.browser_locales,
            default_locale: self.registry.default_locale(),
        };
        PreferenceResolver::new(self.registry).resolve_with_source(&signals)
    }
}

/// True for segments shaped like a language tag: two letters, optionally
/// followed by a region (`pt-BR`, `es-419`) or a script and region (`zh-Hant-TW`).
///
/// Stricter than tag parsing alone so that slugs such as `go-tips` (a valid
/// language plus script) stay ordinary pages.
pub fn looks_like_language_tag(segment: &str) -> bool {
    if segment.contains('_') {
        return false;
    }
    let Some(id) = parse_language_id(segment) else {
        return false;
    };
    if id.language.as_str().len() != 2 || id.variants().next().is_some() {
        return false;
    }

    let subtags: Vec<&str> = segment.split('-').collect();
    match (subtags.as_slice(), id.script, id.region) {
        ([_], None, None) | ([_, _], None, Some(_)) => true,
        ([_, script, _], Some(_), Some(_)) => is_title_case(script),
        _ => false,
    }
}

fn is_title_case(subtag: &str) -> bool {
    let mut chars = subtag.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    struct Fixture {
        registry: LocaleRegistry,
        passthrough: AnyMatcher,
        legacy: LegacyRouteClassifier,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SiteConfig::default();
            Self {
                registry: LocaleRegistry::default(),
                passthrough: AnyMatcher::passthrough(&config.passthrough),
                legacy: LegacyRouteClassifier::from_patterns(&config.legacy.routes).unwrap(),
            }
        }

        fn planner(&self, collapse: bool) -> RedirectPlanner<'_> {
            RedirectPlanner::new(&self.registry, &self.passthrough, &self.legacy, collapse)
        }
    }

    fn redirect(status: RedirectStatus, target: &str) -> RedirectDecision {
        RedirectDecision::Redirect {
            status,
            target: target.to_string(),
        }
    }

    #[test]
    fn test_root_redirects_by_browser_language() {
        let f = Fixture::new();
        let browser = vec!["pt-BR".to_string(), "en-US".to_string()];
        let ctx = RequestContext {
            browser_locales: &browser,
            ..RequestContext::new("/")
        };
        let outcome = f.planner(true).plan(&ctx);
        assert_eq!(outcome.state, RoutingState::RootPath);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/pt"));
        assert_eq!(outcome.source, Some(PreferenceSource::Browser));
    }

    #[test]
    fn test_root_without_signals_uses_default() {
        let f = Fixture::new();
        let outcome = f.planner(true).plan(&RequestContext::new("/"));
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/en"));
        assert_eq!(outcome.source, Some(PreferenceSource::Default));
    }

    #[test]
    fn test_legacy_redirect_uses_stored_preference() {
        let f = Fixture::new();
        let ctx = RequestContext {
            stored_locale: Some("pt"),
            ..RequestContext::new("/posts")
        };
        let outcome = f.planner(true).plan(&ctx);
        assert_eq!(outcome.state, RoutingState::LegacyStatic);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Permanent, "/pt/posts"));
    }

    #[test]
    fn test_legacy_dynamic() {
        let f = Fixture::new();
        let outcome = f.planner(true).plan(&RequestContext::new("/tags/rust/page/2"));
        assert_eq!(outcome.state, RoutingState::LegacyDynamic);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Permanent, "/en/tags/rust/page/2"));
    }

    #[test]
    fn test_already_localized_serves() {
        let f = Fixture::new();
        let outcome = f.planner(true).plan(&RequestContext::new("/en/posts"));
        assert_eq!(outcome.state, RoutingState::AlreadyLocalized);
        match outcome.decision {
            RedirectDecision::Serve { locale, remainder } => {
                assert_eq!(locale.code(), "en");
                assert_eq!(remainder, "/posts");
            }
            other => panic!("expected serve, got {:?}", other),
        }
        assert_eq!(outcome.location, None);
    }

    #[test]
    fn test_url_prefix_beats_stored_preference() {
        let f = Fixture::new();
        let ctx = RequestContext {
            stored_locale: Some("pt"),
            ..RequestContext::new("/en/about")
        };
        let outcome = f.planner(true).plan(&ctx);
        assert!(matches!(outcome.decision, RedirectDecision::Serve { ref locale, .. } if locale.code() == "en"));
    }

    #[test]
    fn test_unknown_prefix_without_collapsing() {
        let f = Fixture::new();
        let outcome = f.planner(false).plan(&RequestContext::new("/fr/about"));
        assert_eq!(outcome.state, RoutingState::UnknownPrefix);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/about"));
    }

    // `collapse_redirect_chains` defaults to true, so with the default config
    // `/fr/about` goes straight to `/en/about` instead of `/about`.
    #[test]
    fn test_unknown_prefix_collapses_into_one_hop() {
        let f = Fixture::new();
        let outcome = f.planner(true).plan(&RequestContext::new("/fr/about"));
        assert_eq!(outcome.state, RoutingState::UnknownPrefix);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/en/about"));

        let outcome = f.planner(true).plan(&RequestContext::new("/fr"));
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/en"));

        let outcome = f.planner(true).plan(&RequestContext::new("/en-GB/contact"));
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/contact"));
    }

    #[test]
    fn test_stacked_unknown_prefixes_collapse() {
        let f = Fixture::new();
        let outcome = f.planner(true).plan(&RequestContext::new("/fr/de-DE/es-419/about"));
        assert_eq!(outcome.state, RoutingState::UnknownPrefix);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/en/about"));

        let outcome = f.planner(true).plan(&RequestContext::new("/fr/de/posts"));
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/en/posts"));

        let outcome = f.planner(false).plan(&RequestContext::new("/fr/de/about"));
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/de/about"));
    }

    #[test]
    fn test_unknown_prefix_never_yields_protocol_relative_target() {
        let f = Fixture::new();
        for collapse in [true, false] {
            let outcome = f.planner(collapse).plan(&RequestContext::new("/fr//evil.example/x"));
            match outcome.decision {
                RedirectDecision::Redirect { target, .. } => assert!(!target.starts_with("//"), "{target}"),
                other => panic!("expected redirect, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_very_deep_unknown_prefix_chain() {
        let f = Fixture::new();
        let path = "/fr".repeat(20_000) + "/about";
        let outcome = f.planner(true).plan(&RequestContext::new(&path));
        assert_eq!(outcome.state, RoutingState::UnknownPrefix);
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, "/en/about"));

        let outcome = f.planner(false).plan(&RequestContext::new(&path));
        assert_eq!(outcome.decision, redirect(RedirectStatus::Temporary, &path[3..]));
    }

    #[test]
    fn test_passthrough() {
        let f = Fixture::new();
        for p in ["/rss.xml", "/api/posts", "/_astro/x.css", "/robots.txt", "/fr/logo.png", "relative"] {
            let outcome = f.planner(true).plan(&RequestContext::new(p));
            assert_eq!(outcome.state, RoutingState::PassThrough, "{p}");
            assert_eq!(outcome.decision, RedirectDecision::PassThrough);
        }
    }

    #[test]
    fn test_unrouted_serves_with_preferred_locale() {
        let f = Fixture::new();
        let ctx = RequestContext {
            stored_locale: Some("pt"),
            ..RequestContext::new("/contact")
        };
        let outcome = f.planner(true).plan(&ctx);
        assert_eq!(outcome.state, RoutingState::Unrouted);
        assert!(matches!(
            outcome.decision,
            RedirectDecision::Serve { ref locale, ref remainder } if locale.code() == "pt" && remainder == "/contact"
        ));
    }

    #[test]
    fn test_location_reattaches_origin_query_fragment() {
        let f = Fixture::new();
        let ctx = RequestContext {
            query: Some("page=2"),
            fragment: Some("top"),
            origin: Some("https://example.com"),
            ..RequestContext::new("/posts")
        };
        let outcome = f.planner(true).plan(&ctx);
        assert_eq!(outcome.location.as_deref(), Some("https://example.com/en/posts?page=2#top"));

        let relative = f.planner(true).plan(&RequestContext::new("/about"));
        assert_eq!(relative.location.as_deref(), Some("/en/about"));
    }

    #[test]
    fn test_language_tag_shapes() {
        for s in ["fr", "EN", "pt-BR", "pt-br", "es-419", "zh-Hant-TW"] {
            assert!(looks_like_language_tag(s), "{s}");
        }
        for s in ["posts", "f", "fra", "go-tips", "hello-world", "12", "pt-BR-x", "zh-hant-TW"] {
            assert!(!looks_like_language_tag(s), "{s}");
        }
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RedirectDecision::PassThrough.outcome_label(), "pass_through");
        assert_eq!(redirect(RedirectStatus::Permanent, "/").status_code(), Some(301));
        assert_eq!(redirect(RedirectStatus::Temporary, "/").outcome_label(), "redirect_302");
        assert!(!RedirectDecision::PassThrough.is_redirect());
    }
}
