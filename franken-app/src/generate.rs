//! The end-to-end harvest: discover components, then visit each one.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use franken_browser::{BrowserConfig, BrowserSession, RateGate};
use franken_config::FrankenConfig;
use franken_scrape::{CatalogClient, ComponentId, Extractor, Harvest, ScrapeError};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::output;

/// Run one full harvest under `cfg`.
///
/// Discovery happens before the browser is started, so an empty catalog or
/// an unreachable site never spawns a browser at all. Once started, the
/// browser is stopped on every exit path, and a CTRL-C cancels the harvest
/// between (or inside) component visits.
pub async fn run(cfg: FrankenConfig) -> Result<()> {
    let base_url =
        Url::parse(&cfg.base_url).with_context(|| format!("invalid base_url: {}", cfg.base_url))?;

    let catalog = CatalogClient::new(base_url.clone())?;
    let components = catalog.components().await?;
    if components.is_empty() {
        return Err(ScrapeError::EmptyCatalog.into());
    }
    info!(count = components.len(), "starting snippet harvest");

    let run_scope = CancellationToken::new();
    let interrupt = run_scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling harvest");
            interrupt.cancel();
        }
    });

    let session = Arc::new(BrowserSession::new(BrowserConfig {
        webdriver_url: cfg.webdriver_url.clone(),
        headless: cfg.headless,
        wait_timeout: cfg.wait_timeout(),
    }));
    session.start().await?;

    let extractor = Extractor::new(
        session.clone(),
        session.cancellation(),
        Arc::new(RateGate::new(cfg.rate_limit_wait())),
        base_url,
        cfg.settle_delay(),
    );

    let outcome = harvest_all(
        &extractor,
        &run_scope,
        &components,
        Path::new(&cfg.output_dir),
    )
    .await;

    // Stop regardless of how the harvest went. A failed close is logged
    // rather than masking the harvest outcome.
    if let Err(error) = session.stop().await {
        warn!(%error, "browser session did not stop cleanly");
    }

    outcome
}

async fn harvest_all(
    extractor: &Extractor,
    run_scope: &CancellationToken,
    components: &[ComponentId],
    output_dir: &Path,
) -> Result<()> {
    for component in components {
        match extractor.extract(run_scope, component).await? {
            Harvest::WorkInProgress => {
                info!(%component, "skipping work-in-progress documentation");
            }
            Harvest::Snippets(snippets) => {
                info!(%component, count = snippets.len(), "component harvested");
                if !snippets.is_empty() {
                    output::write_snippets(output_dir, component, &snippets)?;
                }
            }
        }
    }
    Ok(())
}
