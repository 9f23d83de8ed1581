mod common;

use reqwest::StatusCode;

use common::{client, dead_address, spawn_router, start_echo_upstream};
use locale_router::SiteConfig;

async fn config_with_upstream() -> SiteConfig {
    let upstream = start_echo_upstream().await;
    let mut config = SiteConfig::default();
    config.upstream.address = Some(upstream.to_string());
    config
}

#[tokio::test]
async fn test_served_page_is_forwarded_with_locale_headers() {
    let router = spawn_router(config_with_upstream().await).await;

    let res = client()
        .get(router.url("/pt/posts/ola-mundo?ref=home"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-language"], "pt-BR");
    assert!(res.headers()["link"]
        .to_str()
        .unwrap()
        .contains("<https://blog.odeciomachado.com/en/posts/ola-mundo>; rel=\"alternate\"; hreflang=\"en-us\""));

    let body = res.text().await.unwrap();
    assert!(body.contains("request=GET /pt/posts/ola-mundo?ref=home HTTP/1.1"), "{body}");
    assert!(body.contains("x-locale=pt\n"), "{body}");
    assert!(body.contains("x-locale-remainder=/posts/ola-mundo\n"), "{body}");
    assert!(body.contains("x-routing-state=already_localized\n"), "{body}");
}

#[tokio::test]
async fn test_pass_through_is_forwarded_untouched() {
    let router = spawn_router(config_with_upstream().await).await;

    let res = client()
        .get(router.url("/rss.xml"))
        .header("x-locale", "spoofed")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("content-language").is_none());
    let body = res.text().await.unwrap();
    assert!(body.contains("request=GET /rss.xml HTTP/1.1"), "{body}");
    assert!(!body.contains("x-locale"), "{body}");
}

#[tokio::test]
async fn test_redirects_never_reach_upstream() {
    let router = spawn_router(config_with_upstream().await).await;
    let res = client().get(router.url("/posts")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.text().await.unwrap(), "");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let mut config = SiteConfig::default();
    config.upstream.address = Some(dead_address().await.to_string());
    let router = spawn_router(config).await;

    let res = client().get(router.url("/en/about")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert!(res.headers().get("content-language").is_none());
}
