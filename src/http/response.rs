//! Response building.
//!
//! # Responsibilities
//! - Build 301/302 redirect responses with a `Location` header
//! - Mark preference-dependent responses as uncacheable by shared caches
//! - Attach locale metadata (`Content-Language`, `Link`) to served pages
//! - Render the JSON page context when no upstream renderer is configured
//!
//! # Design Decisions
//! - Header values that cannot be encoded are skipped, never panicked on
//! - Upstream failures map to 502 Bad Gateway

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::schema::TextDirection;
use crate::locale::{FormatRules, LanguageOption, Locale, PreferenceSource};
use crate::routing::planner::{RedirectStatus, RoutingOutcome, RoutingState};
use crate::seo::SeoLinks;

const VARY_PREFERENCE: &str = "Cookie, Accept-Language";
const CACHE_PRIVATE: &str = "private, no-cache";

/// True when the decision depended on the cookie or `Accept-Language`.
pub fn preference_dependent(outcome: &RoutingOutcome) -> bool {
    matches!(outcome.source, Some(source) if source != PreferenceSource::Url)
}

pub fn redirect_response(status: RedirectStatus, location: &str, vary: bool) -> Response {
    let code = match status {
        RedirectStatus::Permanent => StatusCode::MOVED_PERMANENTLY,
        RedirectStatus::Temporary => StatusCode::FOUND,
    };

    let Ok(location) = HeaderValue::from_str(location) else {
        tracing::warn!(location = %location, "Redirect target is not a valid header value");
        return bad_request();
    };

    let mut response = code.into_response();
    response.headers_mut().insert(header::LOCATION, location);
    if vary {
        mark_preference_dependent(response.headers_mut());
    }
    response
}

pub fn mark_preference_dependent(headers: &mut HeaderMap) {
    headers.insert(header::VARY, HeaderValue::from_static(VARY_PREFERENCE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_PRIVATE));
}

/// Add `Content-Language` and the SEO `Link` header to a served page.
pub fn apply_locale_headers(headers: &mut HeaderMap, locale: &Locale, seo: &SeoLinks) {
    if let Ok(value) = HeaderValue::from_str(locale.tag()) {
        headers.insert(header::CONTENT_LANGUAGE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&seo.link_header()) {
        headers.insert(header::LINK, value);
    }
}

/// What the renderer needs to produce a page.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub locale: &'a Locale,
    pub tag: &'a str,
    pub direction: TextDirection,
    pub state: RoutingState,
    pub remainder: &'a str,
    pub seo: &'a SeoLinks,
    pub language_options: Vec<LanguageOption>,
    /// The same page under every locale, as `[code, path]` pairs.
    pub alternate_paths: Vec<(Locale, String)>,
    /// Number and date formatting for `locale`.
    pub format: &'a FormatRules,
}

pub fn page_context_response(context: &PageContext<'_>) -> Response {
    Json(context).into_response()
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad Request").into_response()
}
