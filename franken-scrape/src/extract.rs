//! Browser-side state machine turning one component page into snippets.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use franken_browser::{Automation, BrowserError, RateGate};
use franken_common::cancel::{first_of, until_cancelled};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;
use crate::snippet::{ComponentId, Harvest};
use crate::walk::{DOCS_ROOT_SELECTOR, MARKUP_PANEL_SELECTOR, collect_snippets, wip_notice};

/// Label on the tab that flips an example to its raw markup.
const MARKUP_TAB_LABEL: &str = "Markup";

/// Extracts snippets from component pages via a shared browser session.
///
/// One extractor serves the whole run. Every [`Extractor::extract`] call
/// takes a turn on the [`RateGate`], so pages are visited strictly one at a
/// time with breathing room between visits.
pub struct Extractor {
    automation: Arc<dyn Automation>,
    session_scope: CancellationToken,
    gate: Arc<RateGate>,
    base_url: Url,
    settle_delay: Duration,
}

impl Extractor {
    /// `session_scope` is the token tied to the browser session backing
    /// `automation`; it makes every extraction wind down when the session
    /// stops, whatever the caller's own scope is doing.
    pub fn new(
        automation: Arc<dyn Automation>,
        session_scope: CancellationToken,
        gate: Arc<RateGate>,
        base_url: Url,
        settle_delay: Duration,
    ) -> Self {
        Self {
            automation,
            session_scope,
            gate,
            base_url,
            settle_delay,
        }
    }

    /// Harvest one component page.
    ///
    /// The whole visit answers both `run_scope` and the session's scope;
    /// whichever trips first abandons the in-flight step and surfaces
    /// [`ScrapeError::Cancelled`]. A page announcing itself as work in
    /// progress returns [`Harvest::WorkInProgress`] without touching any
    /// example on it.
    pub async fn extract(
        &self,
        run_scope: &CancellationToken,
        component: &ComponentId,
    ) -> Result<Harvest, ScrapeError> {
        let linked = first_of(run_scope, &self.session_scope);
        let scope = linked.token();

        // The permit spans the whole visit; dropping it on any exit path
        // releases the gate and stamps the release time. The gate only
        // fails on cancellation.
        let Ok(_permit) = self.gate.acquire(scope).await else {
            return Err(ScrapeError::Cancelled);
        };

        let url = component
            .docs_url(&self.base_url)
            .map_err(|e| ScrapeError::Parse {
                what: "component docs url",
                detail: e.to_string(),
            })?;

        debug!(%component, %url, "visiting component page");
        self.step(scope, self.automation.navigate(url.as_str()))
            .await
            .map_err(|source| navigation_error(component, source))?;
        self.step(scope, self.automation.wait_for_selector(DOCS_ROOT_SELECTOR))
            .await
            .map_err(|source| navigation_error(component, source))?;

        // Let client-side rendering settle before reading the page.
        if until_cancelled(scope, tokio::time::sleep(self.settle_delay))
            .await
            .is_none()
        {
            return Err(ScrapeError::Cancelled);
        }

        let page = self
            .step(scope, self.automation.outer_html())
            .await
            .map_err(|source| interaction_error(component, "capture the page", source))?;
        if wip_notice(&page)? {
            info!(%component, "documentation is marked work in progress, skipping");
            return Ok(Harvest::WorkInProgress);
        }

        let clicked = self
            .step(scope, self.automation.click_all_by_text(MARKUP_TAB_LABEL))
            .await
            .map_err(|source| interaction_error(component, "flip examples to markup", source))?;
        debug!(%component, clicked, "markup tabs flipped");

        self.step(scope, self.automation.wait_for_selector(MARKUP_PANEL_SELECTOR))
            .await
            .map_err(|source| interaction_error(component, "wait for markup panels", source))?;

        // Re-capture: the clicks mutated the DOM and the first capture
        // predates them.
        let page = self
            .step(scope, self.automation.outer_html())
            .await
            .map_err(|source| interaction_error(component, "capture the page", source))?;

        let snippets = collect_snippets(&page, component)?;
        info!(%component, count = snippets.len(), "snippets extracted");
        Ok(Harvest::Snippets(snippets))
    }

    /// Run one automation step under the composed scope.
    async fn step<T>(
        &self,
        scope: &CancellationToken,
        op: impl Future<Output = Result<T, BrowserError>>,
    ) -> Result<T, BrowserError> {
        match until_cancelled(scope, op).await {
            Some(result) => result,
            None => Err(BrowserError::Cancelled),
        }
    }
}

fn navigation_error(component: &ComponentId, source: BrowserError) -> ScrapeError {
    match source {
        BrowserError::Cancelled => ScrapeError::Cancelled,
        source => ScrapeError::Navigation {
            component: component.clone(),
            source,
        },
    }
}

fn interaction_error(
    component: &ComponentId,
    operation: &'static str,
    source: BrowserError,
) -> ScrapeError {
    match source {
        BrowserError::Cancelled => ScrapeError::Cancelled,
        source => ScrapeError::Interaction {
            component: component.clone(),
            operation,
            source,
        },
    }
}
