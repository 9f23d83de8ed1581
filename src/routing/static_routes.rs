//! Static route table for build-time page generation.

use serde::Serialize;

use crate::locale::{join_prefix, Locale, LocaleRegistry};

/// One concrete page to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRoute {
    pub locale: Locale,
    /// Logical route without a locale prefix.
    pub route: String,
    /// The localized path, e.g. `/pt/posts`.
    pub path: String,
}

/// Cross product of supported locales and logical routes, locale-major.
pub fn static_routes<S: AsRef<str>>(registry: &LocaleRegistry, routes: &[S]) -> Vec<StaticRoute> {
    registry
        .supported_locales()
        .iter()
        .flat_map(|locale| {
            routes.iter().map(move |route| StaticRoute {
                locale: locale.clone(),
                route: route.as_ref().to_string(),
                path: join_prefix(locale.prefix(), route.as_ref()),
            })
        })
        .collect()
}
