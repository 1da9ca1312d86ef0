//! Component discovery over plain HTTP.
//!
//! The docs navigation lists every page; components are the entries after
//! the "Components" section label. No browser is involved here, one GET of
//! the introduction page is enough.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;
use crate::snippet::{ComponentId, DOCS_PATH_PREFIX};
use crate::walk::selector;

const CATALOG_PAGE_PATH: &str = "/docs/introduction";
const NAV_ITEM_SELECTOR: &str = "aside.aside-l ul.uk-nav li";
const COMPONENTS_SECTION_LABEL: &str = "Components";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches and scans the documentation navigation.
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: Url) -> Result<Self, ScrapeError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ScrapeError::Network {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    /// Discover every documented component, in navigation order.
    pub async fn components(&self) -> Result<Vec<ComponentId>, ScrapeError> {
        let url = self
            .base_url
            .join(CATALOG_PAGE_PATH)
            .map_err(|e| ScrapeError::Parse {
                what: "catalog url",
                detail: e.to_string(),
            })?;
        let network = |source: reqwest::Error| ScrapeError::Network {
            url: url.to_string(),
            source,
        };

        debug!(%url, "fetching component catalog");
        let response = self.http.get(url.clone()).send().await.map_err(network)?;
        let response = response.error_for_status().map_err(network)?;
        let body = response.text().await.map_err(network)?;

        let components = scan_nav_list(&body)?;
        info!(count = components.len(), "discovered components");
        Ok(components)
    }
}

/// Where the scanner is relative to the "Components" section label.
enum ScanState {
    BeforeSentinel,
    AfterSentinel,
}

/// Scan the navigation list for component links.
///
/// Items before the "Components" label belong to other sections of the docs
/// and are ignored. After the label, every item carrying an anchor becomes a
/// component, its id taken from the anchor's `href` with the `/docs/` prefix
/// stripped. Items without an anchor are skipped without ending the scan.
pub fn scan_nav_list(html: &str) -> Result<Vec<ComponentId>, ScrapeError> {
    let document = Html::parse_document(html);
    let nav_item = selector(NAV_ITEM_SELECTOR)?;
    let anchor = selector("a")?;

    let mut state = ScanState::BeforeSentinel;
    let mut components = Vec::new();
    for item in document.select(&nav_item) {
        match state {
            ScanState::BeforeSentinel => {
                let label = item.text().collect::<String>();
                if label.trim() == COMPONENTS_SECTION_LABEL {
                    state = ScanState::AfterSentinel;
                }
            }
            ScanState::AfterSentinel => {
                let Some(href) = item
                    .select(&anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                else {
                    continue;
                };
                let id = href.strip_prefix(DOCS_PATH_PREFIX).unwrap_or(href);
                components.push(ComponentId::new(id));
            }
        }
    }
    Ok(components)
}
