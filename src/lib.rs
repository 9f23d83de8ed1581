//! Locale routing and redirect resolution for a bilingual content site.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod locale;
pub mod observability;
pub mod routing;
pub mod security;
pub mod seo;

pub use config::schema::SiteConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use locale::{Locale, LocaleRegistry};
pub use routing::{LocaleEngine, RedirectDecision, RequestContext, RoutingOutcome};
