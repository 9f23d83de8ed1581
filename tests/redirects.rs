mod common;

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::mpsc;

use common::{client, spawn_router, spawn_router_with_updates};
use locale_router::SiteConfig;

#[tokio::test]
async fn test_root_redirects_by_accept_language() {
    let router = spawn_router(SiteConfig::default()).await;

    let res = client()
        .get(router.url("/"))
        .header("accept-language", "pt-BR,en-US;q=0.8")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], format!("{}/pt", router.origin()));
    assert_eq!(res.headers()["vary"], "Cookie, Accept-Language");
    assert_eq!(res.headers()["cache-control"], "private, no-cache");
}

#[tokio::test]
async fn test_root_without_signals_uses_default_locale() {
    let router = spawn_router(SiteConfig::default()).await;
    let res = client().get(router.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], format!("{}/en", router.origin()));
}

#[tokio::test]
async fn test_legacy_redirect_uses_cookie_and_keeps_query() {
    let router = spawn_router(SiteConfig::default()).await;

    let res = client()
        .get(router.url("/posts?page=2"))
        .header("cookie", "preferredLanguage=pt")
        .header("accept-language", "en-US")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()["location"], format!("{}/pt/posts?page=2", router.origin()));
}

#[tokio::test]
async fn test_legacy_dynamic_redirect() {
    let router = spawn_router(SiteConfig::default()).await;
    let res = client().get(router.url("/tags/rust/page/2")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()["location"], format!("{}/en/tags/rust/page/2", router.origin()));
}

#[tokio::test]
async fn test_forwarded_proto_sets_location_scheme() {
    let router = spawn_router(SiteConfig::default()).await;
    let res = client()
        .get(router.url("/about"))
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["location"], format!("https://{}/en/about", router.addr));
}

#[tokio::test]
async fn test_localized_page_served_as_page_context() {
    let router = spawn_router(SiteConfig::default()).await;

    let res = client()
        .get(router.url("/en/posts"))
        .header("cookie", "preferredLanguage=pt")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-language"], "en-US");
    let link = res.headers()["link"].to_str().unwrap().to_string();
    assert!(link.contains("<https://blog.odeciomachado.com/en/posts>; rel=\"canonical\""));
    assert!(res.headers().get("vary").is_none());

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["locale"], "en");
    assert_eq!(body["remainder"], "/posts");
    assert_eq!(body["state"], "already_localized");
    assert_eq!(body["direction"], "ltr");
    assert_eq!(body["seo"]["alternates"].as_array().unwrap().len(), 3);
    assert_eq!(body["language_options"][1]["path"], "/pt/posts");
    assert_eq!(body["alternate_paths"][1], serde_json::json!(["pt", "/pt/posts"]));
    assert_eq!(body["format"]["decimal_separator"], ".");
    assert_eq!(body["format"]["month_names"][0], "January");
}

#[tokio::test]
async fn test_unknown_prefix_collapses_to_final_target() {
    let router = spawn_router(SiteConfig::default()).await;
    let res = client().get(router.url("/fr/about")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], format!("{}/en/about", router.origin()));
}

#[tokio::test]
async fn test_deep_unknown_prefix_chain_is_answered() {
    let router = spawn_router(SiteConfig::default()).await;
    let path = "/fr".repeat(20_000) + "/about";

    let res = client().get(router.url(&path)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], format!("{}/en/about", router.origin()));

    let res = client().get(router.url("/en")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_prefix_strips_segment_when_not_collapsing() {
    let mut config = SiteConfig::default();
    config.site.collapse_redirect_chains = false;
    let router = spawn_router(config).await;

    let res = client().get(router.url("/fr/about")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], format!("{}/about", router.origin()));
    assert!(res.headers().get("vary").is_none());
}

#[tokio::test]
async fn test_pass_through_without_upstream_is_not_found() {
    let router = spawn_router(SiteConfig::default()).await;
    for path in ["/rss.xml", "/api/search", "/_astro/app.js"] {
        let res = client().get(router.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        assert!(res.headers().get("location").is_none());
    }
}

#[tokio::test]
async fn test_unrouted_page_is_served_in_preferred_locale() {
    let router = spawn_router(SiteConfig::default()).await;
    let res = client()
        .get(router.url("/contact"))
        .header("accept-language", "pt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["vary"], "Cookie, Accept-Language");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["locale"], "pt");
    assert_eq!(body["state"], "unrouted");
    assert_eq!(body["format"]["decimal_separator"], ",");
    assert_eq!(body["alternate_paths"][0], serde_json::json!(["en", "/en/contact"]));
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let router = spawn_router(SiteConfig::default()).await;

    let res = client().get(router.url("/en")).send().await.unwrap();
    let id = res.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");

    let res = client()
        .get(router.url("/en"))
        .header("x-request-id", "trace-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-123");
}

#[tokio::test]
async fn test_config_update_swaps_engine() {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = spawn_router_with_updates(SiteConfig::default(), Some(rx)).await;

    let res = client().get(router.url("/")).send().await.unwrap();
    assert_eq!(res.headers()["location"], format!("{}/en", router.origin()));

    let mut next = SiteConfig::default();
    next.site.default_locale = "pt".to_string();
    tx.send(next).unwrap();

    let mut location = String::new();
    for _ in 0..50 {
        let res = client().get(router.url("/")).send().await.unwrap();
        location = res.headers()["location"].to_str().unwrap().to_string();
        if location.ends_with("/pt") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(location, format!("{}/pt", router.origin()));
}

#[tokio::test]
async fn test_invalid_config_update_is_ignored() {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = spawn_router_with_updates(SiteConfig::default(), Some(rx)).await;

    let mut broken = SiteConfig::default();
    broken.locales.clear();
    tx.send(broken).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let res = client().get(router.url("/en/about")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
