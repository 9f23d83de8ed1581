//! Locale registry: the closed set of supported locales.
//!
//! The registry is built once from configuration and never mutated. A
//! [`Locale`] can only be obtained from a registry, so holding one proves
//! the locale is supported. Codes and prefixes form a bijection, enforced
//! when the registry is built.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::config::schema::{LocaleConfig, TextDirection};
use crate::config::validation::{is_valid_prefix, ValidationError};
use crate::locale::format::FormatRules;

/// Metadata for one supported locale.
#[derive(Debug)]
pub struct LocaleEntry {
    /// Short code (e.g., "en").
    pub code: String,
    /// Path prefix including the leading slash (e.g., "/en").
    pub prefix: String,
    /// Full language tag (e.g., "en-US").
    pub tag: String,
    pub name: String,
    pub native_name: String,
    pub direction: TextDirection,
    /// Open Graph locale (e.g., "en_US").
    pub og_locale: String,
    pub format: FormatRules,
}

/// A supported locale. Cheap to clone; compares by code.
#[derive(Clone)]
pub struct Locale(Arc<LocaleEntry>);

impl Locale {
    pub fn code(&self) -> &str {
        &self.0.code
    }

    /// Path prefix including the leading slash.
    pub fn prefix(&self) -> &str {
        &self.0.prefix
    }

    /// The prefix without its leading slash, as it appears as a path segment.
    pub fn segment(&self) -> &str {
        &self.0.prefix[1..]
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn native_name(&self) -> &str {
        &self.0.native_name
    }

    pub fn direction(&self) -> TextDirection {
        self.0.direction
    }

    pub fn og_locale(&self) -> &str {
        &self.0.og_locale
    }

    pub fn format(&self) -> &FormatRules {
        &self.0.format
    }
}

impl PartialEq for Locale {
    fn eq(&self, other: &Self) -> bool {
        self.0.code == other.0.code
    }
}

impl Eq for Locale {}

impl Hash for Locale {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.code.hash(state);
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locale({})", self.0.code)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.code)
    }
}

/// An entry for a language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    pub code: String,
    pub native_name: String,
    pub path: String,
    pub active: bool,
}

/// Registry of supported locales.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    default: Locale,
}

impl LocaleRegistry {
    /// Build a registry from the configured locale table.
    ///
    /// Fails on the first table defect; [`crate::config::validate_config`]
    /// reports all of them.
    pub fn from_config(configs: &[LocaleConfig], default_code: &str) -> Result<Self, ValidationError> {
        let mut locales: Vec<Locale> = Vec::with_capacity(configs.len());

        for config in configs {
            if !is_valid_prefix(&config.prefix) {
                return Err(ValidationError::InvalidPrefix {
                    code: config.code.clone(),
                    prefix: config.prefix.clone(),
                });
            }
            if locales.iter().any(|l| l.code() == config.code) {
                return Err(ValidationError::DuplicateCode(config.code.clone()));
            }
            if locales.iter().any(|l| l.prefix() == config.prefix) {
                return Err(ValidationError::DuplicatePrefix(config.prefix.clone()));
            }

            locales.push(Locale(Arc::new(LocaleEntry {
                code: config.code.clone(),
                prefix: config.prefix.clone(),
                tag: config.tag.clone(),
                name: config.name.clone(),
                native_name: config.native_name.clone(),
                direction: config.direction,
                og_locale: config.og_locale.clone(),
                format: FormatRules::from_config(&config.format),
            })));
        }

        if locales.is_empty() {
            return Err(ValidationError::NoLocales);
        }

        let default = locales
            .iter()
            .find(|l| l.code() == default_code)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownDefaultLocale(default_code.to_string()))?;

        Ok(Self { locales, default })
    }

    /// Supported locales in configured order.
    pub fn supported_locales(&self) -> &[Locale] {
        &self.locales
    }

    /// The configured default locale.
    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    /// Path prefix for a locale (e.g., "/en").
    pub fn prefix_for<'a>(&self, locale: &'a Locale) -> &'a str {
        locale.prefix()
    }

    /// Locale owning a prefix. Accepts the prefix with or without its
    /// leading slash; matching is exact and case-sensitive.
    pub fn locale_for_prefix(&self, prefix: &str) -> Option<&Locale> {
        let segment = prefix.strip_prefix('/').unwrap_or(prefix);
        self.locales.iter().find(|l| l.segment() == segment)
    }

    /// Locale with exactly this code.
    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.code() == code)
    }

    /// Case-insensitive lookup by code or full tag ("pt", "PT", "pt-BR").
    pub fn lookup(&self, code_or_tag: &str) -> Option<&Locale> {
        let wanted = code_or_tag.trim();
        self.locales
            .iter()
            .find(|l| l.code().eq_ignore_ascii_case(wanted) || l.tag().eq_ignore_ascii_case(wanted))
    }

    /// Locale for a route parameter, falling back to the default.
    pub fn locale_or_default(&self, code: Option<&str>) -> &Locale {
        code.and_then(|c| self.get(c)).unwrap_or(&self.default)
    }

    /// Every supported locale except `current`.
    pub fn others<'a>(&'a self, current: &'a Locale) -> impl Iterator<Item = &'a Locale> + 'a {
        self.locales.iter().filter(move |l| *l != current)
    }

    /// Language switcher entries pointing at the same page in every locale.
    pub fn language_options(&self, remainder: &str, current: &Locale) -> Vec<LanguageOption> {
        self.locales
            .iter()
            .map(|l| LanguageOption {
                code: l.code().to_string(),
                native_name: l.native_name().to_string(),
                path: crate::locale::path::join_prefix(l.prefix(), remainder),
                active: l == current,
            })
            .collect()
    }
}

impl Default for LocaleRegistry {
    /// The bilingual `en`/`pt` registry.
    fn default() -> Self {
        let config = crate::config::SiteConfig::default();
        match Self::from_config(&config.locales, &config.site.default_locale) {
            Ok(registry) => registry,
            Err(e) => unreachable!("built-in locale table is invalid: {e}"),
        }
    }
}
