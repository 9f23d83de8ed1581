//! The compiled locale engine.
//!
//! # Responsibilities
//! - Compile a validated [`SiteConfig`] into registry, matchers and legacy table
//! - Plan requests, build SEO links and list static routes from one snapshot
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Construction is the only fallible step; everything after is total
//! - Hot reload replaces the whole engine, never parts of it

use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::SiteConfig;
use crate::config::validation::validate_config;
use crate::locale::{Locale, LocaleRegistry, PathLocaleMapper};
use crate::routing::legacy::LegacyRouteClassifier;
use crate::routing::matcher::AnyMatcher;
use crate::routing::planner::{RedirectPlanner, RequestContext, RoutingOutcome};
use crate::routing::static_routes::{static_routes, StaticRoute};
use crate::seo::{SeoLinkBuilder, SeoLinks};

#[derive(Debug)]
pub struct LocaleEngine {
    registry: LocaleRegistry,
    passthrough: AnyMatcher,
    legacy: LegacyRouteClassifier,
    base_url: String,
    preference_cookie: String,
    routes: Vec<String>,
    collapse_chains: bool,
}

impl LocaleEngine {
    /// Validate and compile a configuration.
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let single = |e| ConfigError::Validation(vec![e]);
        let registry = LocaleRegistry::from_config(&config.locales, &config.site.default_locale)
            .map_err(single)?;
        let legacy = LegacyRouteClassifier::from_patterns(&config.legacy.routes).map_err(single)?;

        // Validation guarantees the URL parses; normalize away any trailing slash.
        let base_url = Url::parse(&config.site.base_url)
            .map(|u| u.as_str().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| config.site.base_url.trim_end_matches('/').to_string());

        Ok(Self {
            registry,
            passthrough: AnyMatcher::passthrough(&config.passthrough),
            legacy,
            base_url,
            preference_cookie: config.site.preference_cookie.clone(),
            routes: config.site.routes.clone(),
            collapse_chains: config.site.collapse_redirect_chains,
        })
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookie carrying the stored locale preference.
    pub fn preference_cookie(&self) -> &str {
        &self.preference_cookie
    }

    pub fn planner(&self) -> RedirectPlanner<'_> {
        RedirectPlanner::new(&self.registry, &self.passthrough, &self.legacy, self.collapse_chains)
    }

    pub fn mapper(&self) -> PathLocaleMapper<'_> {
        PathLocaleMapper::new(&self.registry)
    }

    /// Plan one request.
    pub fn plan(&self, ctx: &RequestContext<'_>) -> RoutingOutcome {
        self.planner().plan(ctx)
    }

    /// SEO links for a page against the configured base URL.
    pub fn seo(&self, remainder: &str, locale: &Locale) -> SeoLinks {
        SeoLinkBuilder::new(&self.registry).build(&self.base_url, remainder, locale)
    }

    pub fn static_routes(&self) -> Vec<StaticRoute> {
        static_routes(&self.registry, &self.routes)
    }
}
