//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the locale table is a bijection between codes and prefixes
//! - Check the default locale exists
//! - Detect overlapping legacy patterns (fatal at startup)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{LocaleConfig, SiteConfig};
use crate::routing::legacy::LegacyPattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no locales configured")]
    NoLocales,

    #[error("duplicate locale code '{0}'")]
    DuplicateCode(String),

    #[error("duplicate locale prefix '{0}'")]
    DuplicatePrefix(String),

    #[error("locale '{code}' has invalid prefix '{prefix}' (expected '/' followed by one segment)")]
    InvalidPrefix { code: String, prefix: String },

    #[error("default locale '{0}' is not a configured locale")]
    UnknownDefaultLocale(String),

    #[error("locale prefix '{0}' collides with a pass-through prefix")]
    PrefixCollidesWithPassthrough(String),

    #[error("invalid pass-through entry '{0}' (must start with '/')")]
    InvalidPassthrough(String),

    #[error("invalid base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("locale '{code}' has invalid og_locale '{og_locale}' (expected ll_RR)")]
    InvalidOgLocale { code: String, og_locale: String },

    #[error("locale '{code}' needs 12 month names, found {found}")]
    MonthNames { code: String, found: usize },

    #[error("locale '{code}' has max_fraction_digits below min_fraction_digits")]
    FractionDigits { code: String },

    #[error("invalid legacy pattern '{pattern}': {reason}")]
    InvalidLegacyPattern { pattern: String, reason: String },

    #[error("legacy pattern '{0}' starts with a locale prefix")]
    LegacyPatternLocalized(String),

    #[error("legacy patterns '{first}' and '{second}' overlap")]
    OverlappingLegacyPatterns { first: String, second: String },

    #[error("invalid upstream address '{0}'")]
    InvalidUpstream(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_locales(&config.locales, &config.site.default_locale, &mut errors);
    check_site(config, &mut errors);
    check_passthrough(config, &mut errors);
    check_legacy(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Returns true if `prefix` is `/` followed by exactly one non-empty segment without a dot.
pub fn is_valid_prefix(prefix: &str) -> bool {
    match prefix.strip_prefix('/') {
        Some(segment) => !segment.is_empty() && !segment.contains(['/', '.', '?', '#']),
        None => false,
    }
}

fn check_locales(locales: &[LocaleConfig], default_locale: &str, errors: &mut Vec<ValidationError>) {
    if locales.is_empty() {
        errors.push(ValidationError::NoLocales);
        return;
    }

    let mut codes = HashSet::new();
    let mut prefixes = HashSet::new();

    for locale in locales {
        if !codes.insert(locale.code.as_str()) {
            errors.push(ValidationError::DuplicateCode(locale.code.clone()));
        }
        if !is_valid_prefix(&locale.prefix) {
            errors.push(ValidationError::InvalidPrefix {
                code: locale.code.clone(),
                prefix: locale.prefix.clone(),
            });
        } else if !prefixes.insert(locale.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(locale.prefix.clone()));
        }
        if !is_og_locale(&locale.og_locale) {
            errors.push(ValidationError::InvalidOgLocale {
                code: locale.code.clone(),
                og_locale: locale.og_locale.clone(),
            });
        }
        if locale.format.month_names.len() != 12 {
            errors.push(ValidationError::MonthNames {
                code: locale.code.clone(),
                found: locale.format.month_names.len(),
            });
        }
        if locale.format.max_fraction_digits < locale.format.min_fraction_digits {
            errors.push(ValidationError::FractionDigits {
                code: locale.code.clone(),
            });
        }
    }

    if !codes.contains(default_locale) {
        errors.push(ValidationError::UnknownDefaultLocale(default_locale.to_string()));
    }
}

fn is_og_locale(value: &str) -> bool {
    match value.split_once('_') {
        Some((lang, region)) => {
            (2..=3).contains(&lang.len())
                && lang.chars().all(|c| c.is_ascii_lowercase())
                && region.len() == 2
                && region.chars().all(|c| c.is_ascii_uppercase())
        }
        None => false,
    }
}

fn check_site(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    match Url::parse(&config.site.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::InvalidBaseUrl {
                    url: config.site.base_url.clone(),
                    reason: "must not carry a query or fragment".to_string(),
                });
            }
        }
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.site.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.site.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if let Some(address) = &config.upstream.address {
        if address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidUpstream(address.clone()));
        }
    }
}

fn check_passthrough(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    for entry in config.passthrough.prefixes.iter().chain(&config.passthrough.paths) {
        if !entry.starts_with('/') {
            errors.push(ValidationError::InvalidPassthrough(entry.clone()));
        }
    }

    for locale in &config.locales {
        let collides = config.passthrough.prefixes.iter().any(|p| {
            let p = p.trim_end_matches('/');
            p == locale.prefix || locale.prefix.starts_with(&format!("{}/", p))
        });
        if collides {
            errors.push(ValidationError::PrefixCollidesWithPassthrough(locale.prefix.clone()));
        }
    }
}

fn check_legacy(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    let mut parsed: Vec<LegacyPattern> = Vec::new();

    for raw in &config.legacy.routes {
        match LegacyPattern::parse(raw) {
            Ok(pattern) => {
                let localized = config.locales.iter().any(|l| {
                    l.prefix
                        .strip_prefix('/')
                        .is_some_and(|segment| pattern.first_literal() == Some(segment))
                });
                if localized {
                    errors.push(ValidationError::LegacyPatternLocalized(raw.clone()));
                }
                parsed.push(pattern);
            }
            Err(e) => errors.push(e),
        }
    }

    // Pairwise: any two patterns that can match the same path are a defect.
    for (i, first) in parsed.iter().enumerate() {
        for second in parsed.iter().skip(i + 1) {
            if first.overlaps(second) {
                errors.push(ValidationError::OverlappingLegacyPatterns {
                    first: first.source().to_string(),
                    second: second.source().to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&SiteConfig::default()), Ok(()));
    }

    #[test]
    fn test_prefix_shapes() {
        assert!(is_valid_prefix("/en"));
        assert!(is_valid_prefix("/pt-br"));
        assert!(!is_valid_prefix("en"));
        assert!(!is_valid_prefix("/"));
        assert!(!is_valid_prefix("/en/us"));
        assert!(!is_valid_prefix("/en.x"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SiteConfig::default();
        config.locales[1].prefix = "/en".to_string();
        config.locales[1].og_locale = "pt-BR".to_string();
        config.site.default_locale = "fr".to_string();
        config.site.base_url = "ftp://example.com".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicatePrefix("/en".into())));
        assert!(errors.contains(&ValidationError::UnknownDefaultLocale("fr".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidOgLocale { code, .. } if code == "pt")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBaseUrl { .. })));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_empty_locale_table() {
        let mut config = SiteConfig::default();
        config.locales.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::NoLocales));
    }

    #[test]
    fn test_overlapping_legacy_patterns_rejected() {
        let mut config = SiteConfig::default();
        config.legacy.routes.push("/posts/:other".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::OverlappingLegacyPatterns {
                first: "/posts/:slug".into(),
                second: "/posts/:other".into(),
            }]
        );
    }

    #[test]
    fn test_literal_overlapping_parameter_rejected() {
        let mut config = SiteConfig::default();
        config.legacy.routes.push("/tags/rust".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ValidationError::OverlappingLegacyPatterns { first, second }
                if first == "/tags/:tag" && second == "/tags/rust"
        ));
    }

    #[test]
    fn test_legacy_pattern_under_locale_prefix_rejected() {
        let mut config = SiteConfig::default();
        config.legacy.routes.push("/pt/old".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::LegacyPatternLocalized("/pt/old".into())));
    }

    #[test]
    fn test_locale_prefix_shadowed_by_passthrough() {
        let mut config = SiteConfig::default();
        config.passthrough.prefixes.push("/pt".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::PrefixCollidesWithPassthrough("/pt".into())));
    }

    #[test]
    fn test_bad_upstream_and_formats() {
        let mut config = SiteConfig::default();
        config.upstream.address = Some("not an address".into());
        config.locales[0].format.month_names.pop();
        config.locales[0].format.min_fraction_digits = 3;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidUpstream("not an address".into())));
        assert!(errors.contains(&ValidationError::MonthNames { code: "en".into(), found: 11 }));
        assert!(errors.contains(&ValidationError::FractionDigits { code: "en".into() }));
    }
}
