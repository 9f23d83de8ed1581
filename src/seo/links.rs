//! Canonical, hreflang and Open Graph link building.
//!
//! # Responsibilities
//! - Canonical URL for the current locale
//! - One hreflang alternate per supported locale plus `x-default`
//! - Open Graph locale and alternate locales
//!
//! # Design Decisions
//! - Pure transformation: no I/O, no failure modes
//! - hreflang values are lowercase BCP 47 tags (`en-us`, `pt-br`)
//! - A remainder of `/` adds no suffix to the locale prefix

use std::fmt::Write;

use serde::{Serialize, Serializer};

use crate::locale::{join_prefix, Locale, LocaleRegistry};

/// The language a link targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hreflang {
    Locale(Locale),
    XDefault,
}

impl Hreflang {
    /// Attribute value for `hreflang`.
    pub fn value(&self) -> String {
        match self {
            Hreflang::Locale(locale) => locale.tag().to_ascii_lowercase(),
            Hreflang::XDefault => "x-default".to_string(),
        }
    }
}

impl Serialize for Hreflang {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub hreflang: Hreflang,
    pub href: String,
}

/// Everything a page head needs for locale-aware SEO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoLinks {
    pub canonical: String,
    /// Supported locales in registry order, then `x-default`.
    pub alternates: Vec<AlternateLink>,
    pub og_locale: String,
    pub og_alternates: Vec<String>,
}

impl SeoLinks {
    /// Render as `<head>` tags, one per line.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(html, r#"<link rel="canonical" href="{}">"#, escape_attr(&self.canonical));
        for alternate in &self.alternates {
            let _ = writeln!(
                html,
                r#"<link rel="alternate" hreflang="{}" href="{}">"#,
                alternate.hreflang.value(),
                escape_attr(&alternate.href)
            );
        }
        let _ = writeln!(html, r#"<meta property="og:locale" content="{}">"#, escape_attr(&self.og_locale));
        for og in &self.og_alternates {
            let _ = writeln!(html, r#"<meta property="og:locale:alternate" content="{}">"#, escape_attr(og));
        }
        html
    }

    /// Render as an HTTP `Link` header value.
    pub fn link_header(&self) -> String {
        let mut parts = vec![format!(r#"<{}>; rel="canonical""#, self.canonical)];
        parts.extend(self.alternates.iter().map(|a| {
            format!(r#"<{}>; rel="alternate"; hreflang="{}""#, a.href, a.hreflang.value())
        }));
        parts.join(", ")
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Builds [`SeoLinks`] from a registry.
#[derive(Debug, Clone, Copy)]
pub struct SeoLinkBuilder<'a> {
    registry: &'a LocaleRegistry,
}

impl<'a> SeoLinkBuilder<'a> {
    pub fn new(registry: &'a LocaleRegistry) -> Self {
        Self { registry }
    }

    pub fn build(&self, base_url: &str, remainder: &str, current: &Locale) -> SeoLinks {
        let base = base_url.trim_end_matches('/');
        let url_for = |locale: &Locale| format!("{}{}", base, join_prefix(locale.prefix(), remainder));

        let mut alternates: Vec<AlternateLink> = self
            .registry
            .supported_locales()
            .iter()
            .map(|locale| AlternateLink {
                hreflang: Hreflang::Locale(locale.clone()),
                href: url_for(locale),
            })
            .collect();
        alternates.push(AlternateLink {
            hreflang: Hreflang::XDefault,
            href: url_for(self.registry.default_locale()),
        });

        SeoLinks {
            canonical: url_for(current),
            alternates,
            og_locale: current.og_locale().to_string(),
            og_alternates: self
                .registry
                .others(current)
                .map(|l| l.og_locale().to_string())
                .collect(),
        }
    }
}
