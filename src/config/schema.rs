//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so that an empty file describes the bilingual
//! `en`/`pt` site.

use serde::{Deserialize, Serialize};

/// Root configuration for the locale router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Site-wide routing settings.
    pub site: SiteSettings,

    /// Supported locales, in display order.
    pub locales: Vec<LocaleConfig>,

    /// Paths that bypass locale logic entirely.
    pub passthrough: PassthroughConfig,

    /// Pre-localization URL shapes that redirect onto the prefixed scheme.
    pub legacy: LegacyConfig,

    /// Renderer that receives served and pass-through requests.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            site: SiteSettings::default(),
            locales: default_locales(),
            passthrough: PassthroughConfig::default(),
            legacy: LegacyConfig::default(),
            upstream: UpstreamConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Site-wide routing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Absolute base URL used for canonical and alternate links.
    pub base_url: String,

    /// Locale code used when no other signal resolves.
    pub default_locale: String,

    /// Cookie holding the visitor's stored locale preference.
    pub preference_cookie: String,

    /// Logical routes materialized for every locale at build time.
    pub routes: Vec<String>,

    /// Fold an unknown-prefix recovery and the redirect of the stripped
    /// path into a single hop.
    pub collapse_redirect_chains: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "https://blog.odeciomachado.com".to_string(),
            default_locale: "en".to_string(),
            preference_cookie: "preferredLanguage".to_string(),
            routes: ["/", "/posts", "/tags", "/archives", "/search", "/about"]
                .into_iter()
                .map(String::from)
                .collect(),
            collapse_redirect_chains: true,
        }
    }
}

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// A supported locale.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocaleConfig {
    /// Short locale code (e.g., "en").
    pub code: String,

    /// URL path prefix (e.g., "/en"). One segment, unique per locale.
    pub prefix: String,

    /// Full language tag (e.g., "en-US").
    pub tag: String,

    /// English name of the language.
    pub name: String,

    /// Name of the language in the language itself.
    pub native_name: String,

    #[serde(default)]
    pub direction: TextDirection,

    /// Open Graph locale (e.g., "en_US").
    pub og_locale: String,

    /// Number and date formatting rules.
    #[serde(default)]
    pub format: FormatConfig,
}

/// Number and date formatting rules for a locale.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormatConfig {
    pub decimal_separator: String,
    pub group_separator: String,
    pub min_fraction_digits: u8,
    pub max_fraction_digits: u8,

    /// Long date pattern with `{day}`, `{month}` and `{year}` placeholders.
    pub date_pattern: String,

    /// Month names, January first.
    pub month_names: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            decimal_separator: ".".to_string(),
            group_separator: ",".to_string(),
            min_fraction_digits: 0,
            max_fraction_digits: 2,
            date_pattern: "{month} {day}, {year}".to_string(),
            month_names: [
                "January", "February", "March", "April", "May", "June", "July",
                "August", "September", "October", "November", "December",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en".to_string(),
            prefix: "/en".to_string(),
            tag: "en-US".to_string(),
            name: "English".to_string(),
            native_name: "English".to_string(),
            direction: TextDirection::Ltr,
            og_locale: "en_US".to_string(),
            format: FormatConfig::default(),
        },
        LocaleConfig {
            code: "pt".to_string(),
            prefix: "/pt".to_string(),
            tag: "pt-BR".to_string(),
            name: "Portuguese".to_string(),
            native_name: "Português".to_string(),
            direction: TextDirection::Ltr,
            og_locale: "pt_BR".to_string(),
            format: FormatConfig {
                decimal_separator: ",".to_string(),
                group_separator: ".".to_string(),
                min_fraction_digits: 0,
                max_fraction_digits: 2,
                date_pattern: "{day} de {month} de {year}".to_string(),
                month_names: [
                    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho",
                    "agosto", "setembro", "outubro", "novembro", "dezembro",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
            },
        },
    ]
}

/// Paths that bypass locale logic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Prefixes matched on a segment boundary ("/api" matches "/api/x", not "/apiary").
    pub prefixes: Vec<String>,

    /// Exact well-known paths (robots, sitemaps, feeds).
    pub paths: Vec<String>,

    /// Treat any final segment containing a dot as a file.
    pub extension_rule: bool,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            prefixes: ["/_astro", "/api", "/assets"]
                .into_iter()
                .map(String::from)
                .collect(),
            paths: [
                "/robots.txt",
                "/sitemap.xml",
                "/sitemap-index.xml",
                "/rss.xml",
                "/og.png",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            extension_rule: true,
        }
    }
}

/// Legacy route table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Patterns; `:name` marks a free segment.
    pub routes: Vec<String>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            routes: [
                "/posts",
                "/posts/:slug",
                "/posts/page/:page",
                "/tags",
                "/tags/:tag",
                "/tags/:tag/page/:page",
                "/search",
                "/archives",
                "/about",
                "/404",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Upstream renderer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Renderer address (e.g., "127.0.0.1:4321"). When absent, served
    /// requests are answered with a JSON page context.
    pub address: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_bilingual_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.locales.len(), 2);
        assert_eq!(config.locales[0].prefix, "/en");
        assert_eq!(config.locales[1].prefix, "/pt");
        assert_eq!(config.site.default_locale, "en");
        assert!(config.legacy.routes.contains(&"/tags/:tag/page/:page".to_string()));
    }

    #[test]
    fn test_partial_override() {
        let config: SiteConfig = toml::from_str(
            r#"
            [site]
            base_url = "https://example.com"
            default_locale = "pt"

            [upstream]
            address = "127.0.0.1:4321"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.base_url, "https://example.com");
        assert_eq!(config.site.default_locale, "pt");
        assert_eq!(config.site.preference_cookie, "preferredLanguage");
        assert_eq!(config.upstream.address.as_deref(), Some("127.0.0.1:4321"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.locales.len(), 2);
    }

    #[test]
    fn test_locale_table_replaces_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [[locales]]
            code = "es"
            prefix = "/es"
            tag = "es-ES"
            name = "Spanish"
            native_name = "Español"
            direction = "ltr"
            og_locale = "es_ES"
            "#,
        )
        .unwrap();

        assert_eq!(config.locales.len(), 1);
        assert_eq!(config.locales[0].code, "es");
        assert_eq!(config.locales[0].format.max_fraction_digits, 2);
    }
}
