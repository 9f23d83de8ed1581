//! SEO metadata for localized pages.
//!
//! # Data Flow
//! ```text
//! (base URL, remainder, current Locale)
//!     → links.rs (canonical, hreflang alternates, x-default, Open Graph)
//!     → SeoLinks::to_html() for <head> tags
//!     → SeoLinks::link_header() for the HTTP Link header
//! ```

pub mod links;

pub use links::{AlternateLink, Hreflang, SeoLinkBuilder, SeoLinks};
