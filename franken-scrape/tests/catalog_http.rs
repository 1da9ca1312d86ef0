use franken_scrape::{CatalogClient, ComponentId, ScrapeError};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NAV_PAGE: &str = r##"<!doctype html>
<html>
  <body>
    <aside class="aside-l">
      <ul class="uk-nav">
        <li class="uk-nav-header">Getting started</li>
        <li><a href="/docs/introduction">Introduction</a></li>
        <li><a href="/docs/installation">Installation</a></li>
        <li class="uk-nav-header">Components</li>
        <li><a href="/docs/accordion">Accordion</a></li>
        <li><a href="/docs/alert">Alert</a></li>
        <li class="uk-nav-divider"></li>
        <li><a href="/docs/badge">Badge</a></li>
      </ul>
    </aside>
    <div id="docs">Welcome</div>
  </body>
</html>"##;

async fn catalog_for(server: &MockServer) -> CatalogClient {
    let base = Url::parse(&server.uri()).unwrap();
    CatalogClient::new(base).unwrap()
}

#[tokio::test]
async fn discovers_components_from_the_introduction_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/introduction"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(NAV_PAGE, "text/html"))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server).await;
    let components = catalog.components().await.unwrap();

    assert_eq!(
        components,
        vec![
            ComponentId::new("accordion"),
            ComponentId::new("alert"),
            ComponentId::new("badge"),
        ]
    );
}

#[tokio::test]
async fn server_errors_surface_as_network_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/introduction"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let catalog = catalog_for(&server).await;
    let err = catalog.components().await.unwrap_err();

    match err {
        ScrapeError::Network { url, .. } => assert!(url.ends_with("/docs/introduction")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_surfaces_as_network_failure() {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    drop(server);

    let catalog = CatalogClient::new(base).unwrap();
    let err = catalog.components().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Network { .. }));
}

#[tokio::test]
async fn page_without_a_component_section_yields_an_empty_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/introduction"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body><p>No sidebar here.</p></body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let catalog = catalog_for(&server).await;
    let components = catalog.components().await.unwrap();
    assert!(components.is_empty());
}
