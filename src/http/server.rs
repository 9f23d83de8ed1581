//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all locale handler
//! - Wire up middleware (tracing, request ID, timeout, body limit, security headers)
//! - Plan every request against the current engine snapshot
//! - Answer redirects directly; forward served and pass-through requests upstream
//! - Swap in recompiled engines on config reload
//!
//! # Design Decisions
//! - One `ArcSwap` load per request: a request never sees two configs
//! - Listener, timeout and security settings apply at startup only

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        HeaderName, HeaderValue, Request, Uri,
    },
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::loader::ConfigError;
use crate::config::schema::SiteConfig;
use crate::config::validation::ValidationError;
use crate::http::request::{
    MakeRequestUuid, RequestSignals, X_LOCALE, X_LOCALE_REMAINDER, X_REQUEST_ID, X_ROUTING_STATE,
};
use crate::http::response::{
    apply_locale_headers, bad_gateway, mark_preference_dependent, not_found,
    page_context_response, preference_dependent, redirect_response, PageContext,
};
use crate::locale::RequestPath;
use crate::observability::metrics;
use crate::routing::engine::LocaleEngine;
use crate::routing::planner::RedirectDecision;
use crate::security::headers::{strip_hop_by_hop, with_security_headers};

/// Everything a request needs from the current configuration.
#[derive(Debug)]
pub struct Snapshot {
    pub engine: LocaleEngine,
    pub upstream: Option<Authority>,
}

impl Snapshot {
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        let engine = LocaleEngine::from_config(config)?;
        let upstream = config
            .upstream
            .address
            .as_deref()
            .map(|address| {
                Authority::from_str(address)
                    .map_err(|_| ConfigError::Validation(vec![ValidationError::InvalidUpstream(address.to_string())]))
            })
            .transpose()?;
        Ok(Self { engine, upstream })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<ArcSwap<Snapshot>>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the locale router.
pub struct HttpServer {
    router: Router,
    snapshot: Arc<ArcSwap<Snapshot>>,
}

impl HttpServer {
    /// Create a new HTTP server. Fails if the configuration does not compile.
    pub fn new(config: SiteConfig) -> Result<Self, ConfigError> {
        let snapshot = Arc::new(ArcSwap::from_pointee(Snapshot::from_config(&config)?));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            snapshot: snapshot.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, snapshot })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(locale_handler))
            .route("/", any(locale_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        if config.security.enable_headers {
            router = with_security_headers(router);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
        )
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// Configurations received on `config_updates` replace the engine and
    /// upstream atomically; invalid ones are logged and dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: Option<mpsc::UnboundedReceiver<SiteConfig>>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            locales = self.snapshot.load().engine.registry().supported_locales().len(),
            "HTTP server starting"
        );

        if let Some(updates) = config_updates {
            tokio::spawn(apply_config_updates(self.snapshot.clone(), updates));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn apply_config_updates(
    snapshot: Arc<ArcSwap<Snapshot>>,
    mut updates: mpsc::UnboundedReceiver<SiteConfig>,
) {
    while let Some(config) = updates.recv().await {
        match Snapshot::from_config(&config) {
            Ok(next) => {
                snapshot.store(Arc::new(next));
                metrics::record_config_reload(true);
                tracing::info!("Configuration reloaded");
            }
            Err(e) => {
                metrics::record_config_reload(false);
                tracing::error!(error = %e, "Rejected reloaded configuration. Keeping current one.");
            }
        }
    }
}

/// Plans the request and answers, redirects or forwards it.
async fn locale_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let snapshot = state.snapshot.load_full();
    let engine = &snapshot.engine;

    let signals = RequestSignals::from_request(&request, engine.preference_cookie());
    let outcome = engine.plan(&signals.context());
    metrics::record_decision(&outcome);

    let response = match &outcome.decision {
        RedirectDecision::Redirect { status, .. } => {
            let location = outcome.location.as_deref().unwrap_or("/");
            tracing::info!(
                request_id = %signals.request_id,
                path = %signals.path,
                state = outcome.state.as_str(),
                status = status.code(),
                location = %location,
                "Redirecting"
            );
            redirect_response(*status, location, preference_dependent(&outcome))
        }
        RedirectDecision::Serve { locale, remainder } => {
            tracing::debug!(
                request_id = %signals.request_id,
                path = %signals.path,
                state = outcome.state.as_str(),
                locale = %locale,
                remainder = %remainder,
                "Serving"
            );
            let seo = engine.seo(remainder, locale);
            let mut response = match &snapshot.upstream {
                Some(upstream) => {
                    let locale_headers = [
                        (X_LOCALE, locale.code()),
                        (X_LOCALE_REMAINDER, remainder.as_str()),
                        (X_ROUTING_STATE, outcome.state.as_str()),
                    ];
                    forward(&state.client, upstream, request, &locale_headers).await
                }
                None => page_context_response(&PageContext {
                    locale,
                    tag: locale.tag(),
                    direction: locale.direction(),
                    state: outcome.state,
                    remainder,
                    seo: &seo,
                    language_options: engine.registry().language_options(remainder, locale),
                    alternate_paths: engine.mapper().alternate_paths(&RequestPath::rooted(remainder)),
                    format: locale.format(),
                }),
            };
            if response.status().is_success() {
                apply_locale_headers(response.headers_mut(), locale, &seo);
            }
            if preference_dependent(&outcome) {
                mark_preference_dependent(response.headers_mut());
            }
            response
        }
        RedirectDecision::PassThrough => {
            tracing::debug!(request_id = %signals.request_id, path = %signals.path, "Passing through");
            match &snapshot.upstream {
                Some(upstream) => forward(&state.client, upstream, request, &[]).await,
                None => not_found(),
            }
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

/// Forward a request to the upstream renderer, adding `extra` headers.
async fn forward(
    client: &Client<HttpConnector, Body>,
    upstream: &Authority,
    request: Request<Body>,
    extra: &[(HeaderName, &str)],
) -> Response {
    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, upstream = %upstream, "Failed to build upstream URI");
            return bad_gateway();
        }
    };

    strip_hop_by_hop(&mut parts.headers);
    for name in [X_LOCALE, X_LOCALE_REMAINDER, X_ROUTING_STATE] {
        parts.headers.remove(name);
    }
    for (name, value) in extra {
        if let Ok(value) = HeaderValue::from_str(value) {
            parts.headers.insert(name.clone(), value);
        }
    }

    match client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream, error = %e, "Upstream error");
            bad_gateway()
        }
    }
}
