//! Locale preference resolution.
//!
//! # Data Flow
//! ```text
//! PreferenceSignals (url locale, stored preference, browser list, default)
//!     → UrlLocaleTier     (locale from the path prefix)
//!     → StoredLocaleTier  (cookie written by the client on a prior visit)
//!     → BrowserLocaleTier (Accept-Language, exact tag then primary subtag)
//!     → DefaultLocaleTier (configured default, always answers)
//!     → Resolution { locale, source }
//! ```
//!
//! # Design Decisions
//! - Tiers are tried in a fixed order; the first that answers wins
//! - Pure: identical signals always yield the identical locale
//! - Missing or garbled signals are treated as absent, never as errors

use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::locale::registry::{Locale, LocaleRegistry};

/// Per-request inputs to preference resolution. Never mutated.
#[derive(Debug, Clone)]
pub struct PreferenceSignals<'a> {
    /// Locale carried by the URL prefix.
    pub url_locale: Option<&'a Locale>,
    /// Raw stored preference (code or tag).
    pub stored_locale: Option<&'a str>,
    /// Client-preferred language tags, most preferred first.
    pub browser_locales: &'a [String],
    pub default_locale: &'a Locale,
}

/// The tier that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceSource {
    Url,
    Stored,
    Browser,
    Default,
}

impl PreferenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceSource::Url => "url",
            PreferenceSource::Stored => "stored",
            PreferenceSource::Browser => "browser",
            PreferenceSource::Default => "default",
        }
    }
}

/// A resolved locale and the tier that chose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub locale: Locale,
    pub source: PreferenceSource,
}

/// One precedence tier.
pub trait PreferenceTier: Send + Sync + std::fmt::Debug {
    fn source(&self) -> PreferenceSource;

    /// Returns a locale if this tier can answer from the signals.
    fn pick(&self, signals: &PreferenceSignals<'_>, registry: &LocaleRegistry) -> Option<Locale>;
}

/// Locale from the URL prefix, if supported.
#[derive(Debug, Clone, Copy)]
pub struct UrlLocaleTier;

impl PreferenceTier for UrlLocaleTier {
    fn source(&self) -> PreferenceSource {
        PreferenceSource::Url
    }

    fn pick(&self, signals: &PreferenceSignals<'_>, registry: &LocaleRegistry) -> Option<Locale> {
        signals
            .url_locale
            .and_then(|l| registry.get(l.code()))
            .cloned()
    }
}

/// Stored preference, if it names a supported locale.
#[derive(Debug, Clone, Copy)]
pub struct StoredLocaleTier;

impl PreferenceTier for StoredLocaleTier {
    fn source(&self) -> PreferenceSource {
        PreferenceSource::Stored
    }

    fn pick(&self, signals: &PreferenceSignals<'_>, registry: &LocaleRegistry) -> Option<Locale> {
        signals
            .stored_locale
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| registry.lookup(s))
            .cloned()
    }
}

/// Best match from the browser list.
///
/// Each entry is tried in order: an exact match against a locale's code or
/// tag first, then a match on the primary language subtag. The first entry
/// with any match wins.
#[derive(Debug, Clone, Copy)]
pub struct BrowserLocaleTier;

impl PreferenceTier for BrowserLocaleTier {
    fn source(&self) -> PreferenceSource {
        PreferenceSource::Browser
    }

    fn pick(&self, signals: &PreferenceSignals<'_>, registry: &LocaleRegistry) -> Option<Locale> {
        signals
            .browser_locales
            .iter()
            .find_map(|tag| match_browser_tag(tag, registry))
            .cloned()
    }
}

fn match_browser_tag<'r>(tag: &str, registry: &'r LocaleRegistry) -> Option<&'r Locale> {
    let id = parse_language_id(tag)?;

    if let Some(exact) = registry.lookup(&id.to_string()) {
        return Some(exact);
    }

    registry
        .supported_locales()
        .iter()
        .find(|l| parse_language_id(l.code()).is_some_and(|code| code.language == id.language))
}

/// Parse a language tag, treating `und` and garbage as absent.
pub fn parse_language_id(tag: &str) -> Option<LanguageIdentifier> {
    let tag = tag.trim();
    if tag.is_empty() {
        return None;
    }
    let id: LanguageIdentifier = tag.parse().ok()?;
    (id.language.as_str() != "und").then_some(id)
}

/// Configured default; always answers.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLocaleTier;

impl PreferenceTier for DefaultLocaleTier {
    fn source(&self) -> PreferenceSource {
        PreferenceSource::Default
    }

    fn pick(&self, signals: &PreferenceSignals<'_>, _registry: &LocaleRegistry) -> Option<Locale> {
        Some(signals.default_locale.clone())
    }
}

/// Precedence order. Every other component assumes this order.
static TIERS: [&dyn PreferenceTier; 4] = [
    &UrlLocaleTier,
    &StoredLocaleTier,
    &BrowserLocaleTier,
    &DefaultLocaleTier,
];

/// Resolves a single locale from the signal tiers.
#[derive(Debug, Clone, Copy)]
pub struct PreferenceResolver<'a> {
    registry: &'a LocaleRegistry,
}

impl<'a> PreferenceResolver<'a> {
    pub fn new(registry: &'a LocaleRegistry) -> Self {
        Self { registry }
    }

    /// The tiers in precedence order.
    pub fn tiers() -> &'static [&'static dyn PreferenceTier] {
        &TIERS
    }

    pub fn resolve(&self, signals: &PreferenceSignals<'_>) -> Locale {
        self.resolve_with_source(signals).locale
    }

    pub fn resolve_with_source(&self, signals: &PreferenceSignals<'_>) -> Resolution {
        TIERS
            .iter()
            .find_map(|tier| {
                tier.pick(signals, self.registry).map(|locale| Resolution {
                    locale,
                    source: tier.source(),
                })
            })
            .unwrap_or_else(|| Resolution {
                locale: signals.default_locale.clone(),
                source: PreferenceSource::Default,
            })
    }
}

/// Parse an `Accept-Language` header into tags ordered by preference.
///
/// Entries are sorted by q-value (stable, so equal weights keep header
/// order). `q=0`, `*` and malformed entries are dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, u16)> = header
        .split(',')
        .filter_map(|raw| {
            let mut parts = raw.split(';');
            let tag = parts.next()?.trim();
            let id = parse_language_id(tag)?;

            let mut weight = 1000u16;
            for param in parts {
                let (key, value) = param.split_once('=')?;
                if key.trim().eq_ignore_ascii_case("q") {
                    weight = parse_qvalue(value.trim())?;
                }
            }

            (weight > 0).then(|| (id.to_string(), weight))
        })
        .collect();

    weighted.sort_by(|a, b| b.1.cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// q-values as thousandths, so ordering stays integral.
fn parse_qvalue(value: &str) -> Option<u16> {
    let q: f32 = value.parse().ok()?;
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    Some((q * 1000.0).round() as u16)
}
