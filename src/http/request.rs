//! Request handling and signal extraction.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Extract routing signals (path, query, origin, stored preference, browser languages)
//! - Name the locale headers attached to forwarded requests
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Missing or malformed signals are treated as absent, never as errors
//! - Signals are copied out so the request can be forwarded afterwards

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::locale::parse_accept_language;
use crate::routing::planner::RequestContext;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
/// Resolved locale code of a served page.
pub const X_LOCALE: HeaderName = HeaderName::from_static("x-locale");
/// Path without its locale prefix.
pub const X_LOCALE_REMAINDER: HeaderName = HeaderName::from_static("x-locale-remainder");
/// Routing state that decided the request.
pub const X_ROUTING_STATE: HeaderName = HeaderName::from_static("x-routing-state");

/// Generates a UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Owned routing inputs extracted from one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    pub request_id: String,
    pub path: String,
    pub query: Option<String>,
    pub origin: Option<String>,
    pub stored_locale: Option<String>,
    pub browser_locales: Vec<String>,
}

impl RequestSignals {
    pub fn from_request<B>(request: &Request<B>, preference_cookie: &str) -> Self {
        Self::from_parts(request.uri(), request.headers(), preference_cookie)
    }

    pub fn from_parts(uri: &Uri, headers: &HeaderMap, preference_cookie: &str) -> Self {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let accept_language = headers
            .get_all(header::ACCEPT_LANGUAGE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            request_id,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            origin: origin(uri, headers),
            stored_locale: cookie_value(headers, preference_cookie),
            browser_locales: parse_accept_language(&accept_language),
        }
    }

    /// Borrow as planner input. HTTP requests never carry a fragment.
    pub fn context(&self) -> RequestContext<'_> {
        RequestContext {
            path: &self.path,
            query: self.query.as_deref(),
            fragment: None,
            origin: self.origin.as_deref(),
            stored_locale: self.stored_locale.as_deref(),
            browser_locales: &self.browser_locales,
        }
    }
}

/// Scheme and authority the client used, from `Host` and `X-Forwarded-Proto`.
fn origin(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .filter(|h| !h.is_empty() && !h.contains(['/', ' ', '\\', '@']))?;

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|s| s == "http" || s == "https")
        .or_else(|| uri.scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    Some(format!("{}://{}", scheme, host))
}

/// Value of a cookie by name. Empty values count as absent.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
